#![allow(clippy::result_large_err)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
//! Builds Docker Compose files from a typed project model.
//!
//! A [`Project`] holds services, networks, volumes and an optional VPN sidecar. It can be
//! serialized to compose YAML, validated, converted to other formats (docker run, systemd, .env,
//! Komodo TOML) and filled from existing compose files.

pub mod cli;
pub mod convert;
pub mod errors;
pub mod fs;
pub mod import;
pub mod model;
pub mod project;
pub mod serialize;
pub mod settings;
pub mod templates;
pub mod tokenize;
pub mod validate;
pub mod vpn;
pub mod yaml;

pub use convert::{
	Conversion, convert, generate_env_file, generate_komodo_toml, redact, to_docker_run, to_systemd,
};
pub use errors::*;
pub use import::{ParsedTemplate, parse_compose_template};
pub use model::*;
pub use project::{ImportSummary, Project};
pub use serialize::{compose_document, serialize};
pub use settings::Settings;
pub use tokenize::{join_tokens, tokenize};
pub use validate::{reformat, validate, validate_and_reformat};
pub use vpn::{VpnConfig, VpnKind, VpnProvider};
