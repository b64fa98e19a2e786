use colored::*;
use probr_common::config::Config;
use probr_common::network::ports::{COMMON_PORTS, MAX_RANGE_PORTS};
use probr_common::network::services;

use crate::terminal::{colors, print};

/// Prints the ports probed in common mode with their service names.
pub fn services(cfg: &Config) {
    print::header("common ports", cfg.quiet);

    for port in COMMON_PORTS {
        let port_col: ColoredString = format!("{port:>5}").color(colors::PRIMARY);
        print::print_status(format!("{port_col}  {}", services::name_of(*port).color(colors::SECONDARY)));
    }

    if cfg.quiet == 0 {
        print::fat_separator();
        print::centerln(&format!(
            "{} ports; range mode accepts up to {MAX_RANGE_PORTS}",
            COMMON_PORTS.len()
        ));
    }
}
