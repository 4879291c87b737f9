use std::io::stdout;
use std::sync::Arc;

use anyhow::bail;
use clap::{self, Args, Subcommand};
use itertools::Itertools;

use appops::adb::{Adb, ExecAdb};
use appops::pm::AdbPackageInventory;
use appops::{AppFlags, AppInfo, Context, PkgManagerService, Uid};

use crate::parsers::AppFlagsValueParser;

#[derive(Args)]
pub struct Pkgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List installed packages by category
    #[command()]
    List(List),

    /// Show the packages that run as a uid
    #[command()]
    ForUid(ForUid),

    /// Show the uid of a package
    #[command()]
    Uid(PkgUid),

    /// Show the whitelisted packages
    #[command()]
    Whitelist(Whitelist),
}

impl Pkgs {
    pub fn run(&self, ctx: &dyn Context) -> anyhow::Result<()> {
        let service = start_service(ctx)?;
        let res = match &self.command {
            Command::List(c) => c.run(&service),
            Command::ForUid(c) => c.run(&service),
            Command::Uid(c) => c.run(&service),
            Command::Whitelist(c) => c.run(&service),
        };
        service.shutdown();
        res
    }
}

fn start_service(ctx: &dyn Context) -> anyhow::Result<PkgManagerService> {
    let adb: Arc<dyn Adb> = Arc::new(ExecAdb::new(ctx)?);
    let inventory = AdbPackageInventory::from_context(ctx, adb)?;
    let service = PkgManagerService::from_context(ctx)?;
    service.on_start(Box::new(inventory));
    Ok(service)
}

#[derive(Args)]
struct List {
    /// Comma separated categories: user, system, system-uid, system-media,
    /// system-phone, web-view-provider, whitelisted or all
    #[arg(short, long, value_parser = AppFlagsValueParser)]
    flags: Option<AppFlags>,

    /// Output JSON instead of text
    #[arg(short, long, default_value_t = false, action = clap::ArgAction::SetTrue)]
    json: bool,
}

impl List {
    fn run(&self, service: &PkgManagerService) -> anyhow::Result<()> {
        let apps = match self.flags {
            Some(flags) => service.installed_pkgs(flags)?,
            None => service.all_apps()?,
        };
        if self.json {
            serde_json::to_writer(stdout(), &apps)?;
            return Ok(());
        }
        for app in &apps {
            show_app(app);
        }
        Ok(())
    }
}

fn show_app(app: &AppInfo) {
    println!("{:<6} {} [{}]", app.uid, app.pkg_name, app.flags);
}

#[derive(Args)]
struct ForUid {
    uid: Uid,
}

impl ForUid {
    fn run(&self, service: &PkgManagerService) -> anyhow::Result<()> {
        match service.pkg_names_for_uid(self.uid)? {
            Some(names) => println!("{}", names.iter().join("\n")),
            None => bail!("no packages for uid {}", self.uid),
        }
        Ok(())
    }
}

#[derive(Args)]
struct PkgUid {
    package: String,
}

impl PkgUid {
    fn run(&self, service: &PkgManagerService) -> anyhow::Result<()> {
        match service.uid_for_pkg_name(&self.package)? {
            Some(uid) => println!("{}", uid),
            None => bail!("{} is not installed", self.package),
        }
        Ok(())
    }
}

#[derive(Args)]
struct Whitelist {}

impl Whitelist {
    fn run(&self, service: &PkgManagerService) -> anyhow::Result<()> {
        for pkg in service.whitelist_pkgs()? {
            println!("{}", pkg);
        }
        Ok(())
    }
}
