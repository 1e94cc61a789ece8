use anyhow::Result;
use std::{env, path::PathBuf};

#[derive(Clone, Debug)]
pub struct Paths {
    pub config: PathBuf,
}

/// Resolve the branchkeeper home directory.
///
/// `$XDG_CONFIG_HOME/.bk`, falling back to `$HOME/.config/.bk`.
pub fn bk_home() -> Result<PathBuf> {
    let xdg = env::var_os("XDG_CONFIG_HOME");
    let base = xdg
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env::var_os("HOME").unwrap_or_default()).join(".config"));
    Ok(base.join(".bk"))
}

pub fn paths() -> Result<Paths> {
    let home = bk_home()?;
    Ok(Paths {
        config: home.join("config.toml"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn home_prefers_xdg_config_home() {
        let td = tempfile::tempdir().unwrap();
        let prev = env::var_os("XDG_CONFIG_HOME");
        unsafe { env::set_var("XDG_CONFIG_HOME", td.path()) };

        let p = paths().unwrap();
        assert_eq!(bk_home().unwrap(), td.path().join(".bk"));
        assert_eq!(p.config, td.path().join(".bk").join("config.toml"));

        match prev {
            Some(v) => unsafe { env::set_var("XDG_CONFIG_HOME", v) },
            None => unsafe { env::remove_var("XDG_CONFIG_HOME") },
        }
    }
}
