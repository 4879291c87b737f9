use std::io::stdout;

use clap::{self, Args, Subcommand};

use appops::ops::OpRow;
use appops::{ModeResolver, Op};

use crate::parsers::OpValueParser;

#[derive(Args)]
pub struct Ops {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show every op in the table
    #[command()]
    List(List),

    /// Show a single op
    #[command()]
    Show(Show),

    /// Find the op guarded by a permission
    #[command()]
    ForPermission(ForPermission),

    /// Print the name of a numeric mode
    #[command()]
    ModeName(ModeName),
}

impl Ops {
    pub fn run(&self) -> anyhow::Result<()> {
        let resolver = ModeResolver::default();
        match &self.command {
            Command::List(c) => c.run(&resolver),
            Command::Show(c) => c.run(&resolver),
            Command::ForPermission(c) => c.run(&resolver),
            Command::ModeName(c) => c.run(&resolver),
        }
    }
}

fn show_row(row: &OpRow) {
    println!(
        "{:>3} {:<36} {:<40} switch={:<3} perm={} restriction={} default={} bypass={} reset={}",
        row.op,
        row.name,
        row.public_name.as_deref().unwrap_or("-"),
        row.switch,
        row.permission.as_deref().unwrap_or("-"),
        row.restriction.as_deref().unwrap_or("-"),
        row.default_mode,
        row.allow_system_bypass,
        row.allow_reset,
    );
}

#[derive(Args)]
struct List {
    /// Output JSON instead of text
    #[arg(short, long, default_value_t = false, action = clap::ArgAction::SetTrue)]
    json: bool,
}

impl List {
    fn run(&self, resolver: &ModeResolver) -> anyhow::Result<()> {
        let rows: Vec<&OpRow> = resolver.table().ops().collect();
        if self.json {
            serde_json::to_writer(stdout(), &rows)?;
            return Ok(());
        }
        for row in rows {
            show_row(row);
        }
        Ok(())
    }
}

#[derive(Args)]
struct Show {
    /// Numeric id, debug name or public id of the op
    #[arg(value_parser = OpValueParser)]
    op: Op,

    /// Output JSON instead of text
    #[arg(short, long, default_value_t = false, action = clap::ArgAction::SetTrue)]
    json: bool,
}

impl Show {
    fn run(&self, resolver: &ModeResolver) -> anyhow::Result<()> {
        let row = resolver.table().get(self.op);
        if self.json {
            serde_json::to_writer(stdout(), row)?;
        } else {
            show_row(row);
        }
        Ok(())
    }
}

#[derive(Args)]
struct ForPermission {
    /// Fully qualified permission, such as android.permission.CAMERA
    permission: String,
}

impl ForPermission {
    fn run(&self, resolver: &ModeResolver) -> anyhow::Result<()> {
        let op = resolver.op_for_permission(&self.permission);
        println!("{}", resolver.name_for(op));
        Ok(())
    }
}

#[derive(Args)]
struct ModeName {
    /// Mode number
    #[arg(allow_negative_numbers = true)]
    mode: i32,
}

impl ModeName {
    fn run(&self, resolver: &ModeResolver) -> anyhow::Result<()> {
        println!("{}", resolver.mode_name(self.mode));
        Ok(())
    }
}
