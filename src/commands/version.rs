use clap::Args;

use super::{CmdResult, GlobalArgs};

#[derive(Args, Debug)]
pub struct VersionArgs {}

pub fn run(_args: VersionArgs, _global: &GlobalArgs) -> CmdResult<()> {
    println!("xrun v{}", crate::VERSION);
    Ok(((), 0))
}
