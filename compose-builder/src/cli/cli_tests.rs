use std::{
	fs::{create_dir_all, read_to_string, remove_dir_all},
	io,
	path::PathBuf,
	sync::{Arc, Mutex},
};

use clap::Parser;
use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::{
	cli::{Cli, Commands, execute_cli},
	convert::Conversion,
	errors::BuildError,
	fs::{deserialize_file, write_file},
	project::Project,
};

const PROJECT: &str = indoc! {r#"
  services:
    - name: web
      image: nginx:latest
      restart: always
      ports:
        - host: "80"
          container: "80"
          protocol: tcp
      environment:
        - key: TZ
          value: UTC
"#};

fn reset_testing_dir(name: &str) -> PathBuf {
	let dir = PathBuf::from("tests/output/cli").join(name);

	if dir.exists() {
		remove_dir_all(&dir)
			.unwrap_or_else(|e| panic!("Failed to empty the output dir '{}': {e}", dir.display()));
	}

	create_dir_all(&dir)
		.unwrap_or_else(|e| panic!("Failed to create the output dir '{}': {e}", dir.display()));

	dir
}

fn cli(args: &[&str]) -> Cli {
	Cli::try_parse_from(
		["compose-builder", "--ignore-config"]
			.iter()
			.chain(args),
	)
	.unwrap_or_else(|e| panic!("Failed to parse the arguments: {e}"))
}

#[test]
fn parses_conversion_kinds() {
	let cli = cli(&["convert", "docker-run", "project.yaml", "--service", "web"]);

	let Commands::Convert { kind, service, .. } = cli.command else {
		panic!("Expected the convert command");
	};

	assert_eq!(kind, Conversion::DockerRun);
	assert_eq!(service.as_deref(), Some("web"));
}

#[test]
fn generate_and_convert() -> Result<(), Box<dyn std::error::Error>> {
	let dir = reset_testing_dir("generate");
	let project = dir.join("project.yaml");
	write_file(&project, PROJECT)?;

	let compose = dir.join("docker-compose.yml");
	execute_cli(cli(&[
		"generate",
		project.to_str().unwrap_or_default(),
		"-o",
		compose.to_str().unwrap_or_default(),
	]))?;

	assert_eq!(
		read_to_string(&compose)?,
		indoc! {r#"
      services:
        web:
          image: nginx:latest
          restart: always
          ports:
            - "80:80/tcp"
          environment:
            - TZ=UTC
    "#}
	);

	let unit = dir.join("web.service");
	execute_cli(cli(&[
		"convert",
		"systemd",
		project.to_str().unwrap_or_default(),
		"-o",
		unit.to_str().unwrap_or_default(),
	]))?;

	assert!(read_to_string(&unit)?.contains("Restart=always"));

	Ok(())
}

#[test]
fn import_writes_a_project_file() -> Result<(), Box<dyn std::error::Error>> {
	let dir = reset_testing_dir("import");
	let compose = dir.join("docker-compose.yml");
	write_file(
		&compose,
		indoc! {r#"
      services:
        db:
          image: postgres:16
          volumes:
            - db-data:/var/lib/postgresql/data
      volumes:
        db-data:
    "#},
	)?;

	let output = dir.join("project.toml");
	execute_cli(cli(&[
		"import",
		compose.to_str().unwrap_or_default(),
		"-o",
		output.to_str().unwrap_or_default(),
	]))?;

	let project: Project = deserialize_file(&output)?;

	assert_eq!(project.services.len(), 1);
	assert_eq!(project.services[0].name, "db");
	assert_eq!(project.volumes[0].name, "db-data");

	Ok(())
}

#[test]
fn validation_errors_are_returned() -> Result<(), Box<dyn std::error::Error>> {
	let dir = reset_testing_dir("validate");
	let project = dir.join("project.json");
	write_file(
		&project,
		r#"{"services": [{"name": "web", "image": "nginx", "ports": [{"host": "70000", "container": "80"}]}]}"#,
	)?;

	let Err(BuildError::Validation(errors)) =
		execute_cli(cli(&["validate", project.to_str().unwrap_or_default()]))
	else {
		panic!("Expected a validation error");
	};

	assert_eq!(
		errors,
		vec!["Service `web`: host port `70000` must be between 1 and 65535".to_string()]
	);

	Ok(())
}

#[test]
fn unknown_project_format() {
	let err = execute_cli(cli(&["generate", "project.ini"])).unwrap_err();

	assert!(matches!(err, BuildError::UnsupportedExtension { .. }));
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
	fn text(&self) -> String {
		let bytes = self
			.0
			.lock()
			.unwrap_or_else(std::sync::PoisonError::into_inner);
		String::from_utf8_lossy(&bytes).into_owned()
	}
}

impl io::Write for CapturedLogs {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self
			.0
			.lock()
			.unwrap_or_else(std::sync::PoisonError::into_inner)
			.extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

fn logs_of(args: &[&str]) -> Result<String, BuildError> {
	let logs = CapturedLogs::default();
	let writer = logs.clone();
	let subscriber = tracing_subscriber::fmt()
		.with_writer(move || writer.clone())
		.with_ansi(false)
		.finish();

	tracing::subscriber::with_default(subscriber, || execute_cli(cli(args)))?;

	Ok(logs.text())
}

#[test]
fn vpn_warnings_are_logged() -> Result<(), Box<dyn std::error::Error>> {
	let dir = reset_testing_dir("vpn_warnings");
	let project = dir.join("project.yaml");
	write_file(
		&project,
		&format!(
			"{PROJECT}{}",
			indoc! {r#"
        vpn:
          enabled: true
          provider:
            type: tailscale
          services_using_vpn: [web]
      "#}
		),
	)?;
	let path = project.to_str().unwrap_or_default();

	let logs = logs_of(&["validate", path])?;
	assert!(logs.contains("WARN"));
	assert!(logs.contains("Tailscale Auth Key is required"));

	let logs = logs_of(&["--no-vpn-warnings", "validate", path])?;
	assert!(!logs.contains("Tailscale Auth Key is required"));

	Ok(())
}
