pub const DEFAULT_CONFIG_TOML: &str = r#"
[lookup]
endpoint = ""
catalog = ""
limit = 8
timeout_ms = 3000
case_sensitive = false

[composer]
trigger_scope = "caret"
placeholders = ["Ask anything…", "@ to add documents as context"]
placeholder_interval_ms = 2000

[display_overrides]
"AD4080" = "AD4080 Data Sheet (Rev. A)"
"AD4081" = "AD4081 Data Sheet (Rev. 0)"
"AD4084" = "AD4084 Data Sheet (Rev. 0)"
"AD9207" = "AD9207 Data Sheet (Rev. 0)"
"LTM2173-14" = "LTM2173-14 Data Sheet (Rev. A)"
"ADE9112" = "ADE9112 Data Sheet (Rev. A)"
"ADUM7704" = "ADUM7704 Data Sheet (Rev. A)"
"ADE7912" = "ADE7912 Data Sheet (Rev. C)"
"ADE7913" = "ADE7913 Data Sheet (Rev. C)"
"#;
