//! Version and banner text shown by `rip version`.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const COPYRIGHT: &str = "copyright © Thomas Ingram";

pub const LOGO: &str = r"         _            _          _
        /\ \         /\ \       /\ \
       /  \ \        \ \ \     /  \ \
      / /\ \ \       /\ \_\   / /\ \ \
     / / /\ \_\     / /\/_/  / / /\ \_\
    / / /_/ / /    / / /    / / /_/ / /
   / / /__\/ /    / / /    / / /__\/ /
  / / /_____/    / / /    / / /_____/
 / / /\ \ \  ___/ / /__  / / /
/ / /  \ \ \/\__\/_/___\/ / /
\/_/    \_\/\/_________/\/_/";

/// The bare version, or `Rip version <version>` when verbose.
pub fn version(verbose: bool) -> String {
    if verbose {
        format!("Rip version {VERSION}")
    } else {
        VERSION.to_string()
    }
}

/// Version and copyright, one per line.
pub fn summary(verbose: bool) -> String {
    format!("{}\n{COPYRIGHT}", version(verbose))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches_package() {
        assert_eq!(version(false), "0.1.0");
        assert_eq!(version(true), "Rip version 0.1.0");
    }

    #[test]
    fn test_summary_carries_copyright() {
        assert_eq!(summary(false), "0.1.0\ncopyright © Thomas Ingram");
    }
}
