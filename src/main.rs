#[macro_use] extern crate clap;
#[macro_use] extern crate lazy_static;
#[macro_use] extern crate log;

pub mod config;
pub mod demos;
pub mod graphics;
pub mod interface;
pub mod renderer;
pub mod window;

use interface::cli::cli_main;

fn main() {
    cli_main();
}
