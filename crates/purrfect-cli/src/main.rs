mod agent;
mod command;
mod save;
mod util;
mod view;

fn main() -> anyhow::Result<()> {
    command::run()
}
