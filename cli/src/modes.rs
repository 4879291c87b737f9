use std::sync::Arc;

use clap::{self, Args, Subcommand};

use appops::adb::{Adb, ExecAdb};
use appops::ops::ShellAppOpsService;
use appops::{Context, Mode, ModeResolver, Op, OpClient, Uid, UserId};

use crate::parsers::{ModeValueParser, OpValueParser};

#[derive(Args)]
pub struct Modes {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the effective mode of an op for a package
    #[command()]
    Check(Check),

    /// Set the mode of an op for a package
    #[command()]
    Set(Set),

    /// Set the mode of an op for every package of a uid
    #[command()]
    SetUid(SetUid),

    /// Reset modes to their defaults
    #[command()]
    Reset(Reset),
}

impl Modes {
    pub fn run(&self, ctx: &dyn Context) -> anyhow::Result<()> {
        let adb: Arc<dyn Adb> = Arc::new(ExecAdb::new(ctx)?);
        let service = ShellAppOpsService::new(adb, ModeResolver::default());
        let client = OpClient::new(Arc::new(service));
        match &self.command {
            Command::Check(c) => c.run(&client),
            Command::Set(c) => c.run(&client),
            Command::SetUid(c) => c.run(&client),
            Command::Reset(c) => c.run(&client),
        }
    }
}

#[derive(Args)]
struct Check {
    #[arg(value_parser = OpValueParser)]
    op: Op,
    uid: Uid,
    package: String,
}

impl Check {
    fn run(&self, client: &OpClient) -> anyhow::Result<()> {
        let mode = client.check_operation(self.op, self.uid, &self.package)?;
        println!("{}", mode);
        Ok(())
    }
}

#[derive(Args)]
struct Set {
    #[arg(value_parser = OpValueParser)]
    op: Op,
    uid: Uid,
    package: String,
    #[arg(value_parser = ModeValueParser)]
    mode: Mode,
}

impl Set {
    fn run(&self, client: &OpClient) -> anyhow::Result<()> {
        client.set_mode(self.op, self.uid, &self.package, self.mode)?;
        Ok(())
    }
}

#[derive(Args)]
struct SetUid {
    #[arg(value_parser = OpValueParser)]
    op: Op,
    uid: Uid,
    #[arg(value_parser = ModeValueParser)]
    mode: Mode,
}

impl SetUid {
    fn run(&self, client: &OpClient) -> anyhow::Result<()> {
        client.set_uid_mode(self.op, self.uid, self.mode)?;
        Ok(())
    }
}

#[derive(Args)]
struct Reset {
    /// Only reset modes for this user
    #[arg(short, long)]
    user: Option<UserId>,

    /// Only reset modes for this package
    package: Option<String>,
}

impl Reset {
    fn run(&self, client: &OpClient) -> anyhow::Result<()> {
        client.reset_all_modes(self.user, self.package.as_deref())?;
        Ok(())
    }
}
