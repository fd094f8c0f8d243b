//! CLI command for guarding overlapping keys

use console::style;

use crate::timeline_replace::disambiguate;

pub fn execute(keys: &[String]) {
    for (key, guarded) in disambiguate(keys) {
        if key == guarded {
            println!("{key}");
        } else {
            println!("{key} {} {}", style("->").dim(), style(guarded).cyan());
        }
    }
}
