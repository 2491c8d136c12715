#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_defaults_match_shipped_layout() {
        let config = Config::default();
        assert_eq!(config.database.path, PathBuf::from("data.db"));
        assert_eq!(config.server.port, 3001);
        let names: Vec<_> = config.viewer.structures.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["EGFR", "Aptamer-IV", "Aptamer-VI", "Aptamer-VII"]);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::parse(
            r#"
            [database]
            path = ":memory:"

            [server]
            port = 8080
            "#,
        )
        .unwrap();
        assert_eq!(config.database.path, PathBuf::from(":memory:"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.addr().unwrap().port(), 8080);
        assert!(config.viewer.find("EGFR").is_some());
    }

    #[test]
    fn test_custom_structures_replace_defaults() {
        let config = Config::parse(
            r#"
            [[viewer.structures]]
            name = "1M17"
            path = "structures/1m17.pdb"
            "#,
        )
        .unwrap();
        assert_eq!(config.viewer.structures.len(), 1);
        assert!(config.viewer.find("EGFR").is_none());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gliotarget.toml");
        std::fs::write(&path, "[server]\nhost = \"0.0.0.0\"\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
    }
}
