use std::collections::HashMap;

use compose_builder::{
	vpn::{NewtConfig, TailscaleConfig},
	*,
};
use indoc::indoc;
use maplit::hashmap;
use pretty_assertions::assert_eq;

fn web() -> ServiceConfig {
	ServiceConfig {
		ports: vec![PortMapping::new("80", "80", Protocol::Tcp)],
		..ServiceConfig::new("web", "nginx:latest")
	}
}

fn project_with(services: Vec<ServiceConfig>) -> Project {
	Project {
		services,
		..Default::default()
	}
}

fn env_map(env: &[KeyValue]) -> HashMap<String, String> {
	env
		.iter()
		.map(|kv| (kv.key.clone(), kv.value.clone()))
		.collect()
}

#[test]
fn single_web_service() {
	assert_eq!(
		serialize(&project_with(vec![web()])),
		indoc! {r#"
      services:
        web:
          image: nginx:latest
          ports:
            - "80:80/tcp"
    "#}
	);
}

#[test]
fn unnamed_services_are_filtered() -> Result<(), Box<dyn std::error::Error>> {
	let output = serialize(&project_with(vec![ServiceConfig::default(), web()]));

	let parsed: serde_yaml_ng::Value = serde_yaml_ng::from_str(&output)?;
	let services = parsed["services"]
		.as_mapping()
		.ok_or("Missing services")?;

	assert_eq!(services.len(), 1);

	Ok(())
}

#[test]
fn array_environment_survives_reformat() -> Result<(), Box<dyn std::error::Error>> {
	let service = ServiceConfig {
		environment: vec![
			KeyValue::new("TZ", "Europe/Rome"),
			KeyValue::new("DATABASE_URL", "postgres://db:5432/app?sslmode=disable"),
			KeyValue::new("GREETING", "hello: world"),
			KeyValue::new("EMPTY", ""),
		],
		..web()
	};

	let reformatted = reformat(&serialize(&project_with(vec![service.clone()])))?;

	let template = parse_compose_template(&reformatted)?;

	assert_eq!(
		env_map(&template.services[0].environment),
		hashmap! {
			"TZ".to_string() => "Europe/Rome".to_string(),
			"DATABASE_URL".to_string() => "postgres://db:5432/app?sslmode=disable".to_string(),
			"GREETING".to_string() => "hello: world".to_string(),
			"EMPTY".to_string() => String::new(),
		}
	);
	assert_eq!(template.services[0].environment, service.environment);

	Ok(())
}

#[test]
fn reformat_is_stable() -> Result<(), Box<dyn std::error::Error>> {
	let mut db = ServiceConfig {
		command: "postgres -c 'max_connections=200'".to_string(),
		volumes: vec![VolumeMount::new("db-data", "/var/lib/postgresql/data")],
		healthcheck: Some(Healthcheck {
			test: "CMD-SHELL pg_isready -U postgres".to_string(),
			interval: "10s".to_string(),
			retries: "5".to_string(),
			..Default::default()
		}),
		labels: vec![KeyValue::new("traefik.enable", "false")],
		..ServiceConfig::new("db", "postgres:16")
	};
	db.deploy.resources.limits.memory = "1g".to_string();

	let project = Project {
		services: vec![web(), db],
		networks: vec![NetworkConfig::new("backend")],
		volumes: vec![VolumeConfig::new("db-data")],
		..Default::default()
	};

	let once = validate_and_reformat(&project)?;
	let twice = reformat(&once)?;

	assert_eq!(once, twice);

	Ok(())
}

#[test]
fn tailscale_shares_its_network() -> Result<(), Box<dyn std::error::Error>> {
	let project = Project {
		services: vec![web()],
		vpn: VpnConfig {
			enabled: true,
			provider: Some(VpnProvider::Tailscale(TailscaleConfig {
				auth_key: "${TS_AUTHKEY}".to_string(),
				..Default::default()
			})),
			services_using_vpn: vec!["web".to_string()],
			..Default::default()
		},
		..Default::default()
	};

	let parsed: serde_yaml_ng::Value = serde_yaml_ng::from_str(&serialize(&project))?;
	let web = &parsed["services"]["web"];

	assert!(web.get("ports").is_none());
	assert_eq!(web["network_mode"].as_str(), Some("service:tailscale"));
	assert_eq!(parsed["services"]["tailscale"]["image"].as_str(), Some("tailscale/tailscale:latest"));

	Ok(())
}

#[test]
fn newt_joins_the_service_network() -> Result<(), Box<dyn std::error::Error>> {
	let project = Project {
		services: vec![web()],
		vpn: VpnConfig {
			enabled: true,
			provider: Some(VpnProvider::Newt(NewtConfig::default())),
			services_using_vpn: vec!["web".to_string()],
			..Default::default()
		},
		..Default::default()
	};

	let parsed: serde_yaml_ng::Value = serde_yaml_ng::from_str(&serialize(&project))?;
	let web = &parsed["services"]["web"];

	assert_eq!(web["ports"][0].as_str(), Some("80:80/tcp"));
	assert_eq!(web["networks"][0].as_str(), Some("newt"));
	assert_eq!(parsed["networks"]["newt"]["external"].as_bool(), Some(true));

	Ok(())
}

#[test]
fn redacts_the_generated_file() {
	let project = project_with(vec![ServiceConfig {
		environment: vec![
			KeyValue::new("DB_PASSWORD", "hunter2"),
			KeyValue::new("TZ", "UTC"),
		],
		..web()
	}]);

	let redacted = convert(Conversion::Redact, &project, None);

	assert!(redacted.contains("DB_PASSWORD=***REDACTED***"));
	assert!(redacted.contains("TZ=UTC"));
	assert!(!redacted.contains("hunter2"));
}

#[test]
fn removals_leave_no_dangling_references() -> Result<(), Box<dyn std::error::Error>> {
	let mut project = Project::default();

	project.import_template(indoc! {r#"
    services:
      app:
        image: ghcr.io/acme/app
        networks: [frontend, backend]
        volumes:
          - app-data:/data
          - ./config:/config:ro
        depends_on: [cache]
      cache:
        image: redis
        networks:
          backend:
    networks:
      frontend:
      backend:
        internal: true
    volumes:
      app-data:
  "#})?;

	project.remove_network("backend");
	project.remove_volume("app-data");
	project.remove_service("cache");

	assert_eq!(
		serialize(&project),
		indoc! {r#"
      services:
        app:
          image: ghcr.io/acme/app
          volumes:
            - ./config:/config:ro
          networks:
            - frontend
      networks:
        frontend: {}
    "#}
	);

	Ok(())
}

#[test]
fn imported_files_serialize_back() -> Result<(), Box<dyn std::error::Error>> {
	let input = indoc! {r#"
    services:
      proxy:
        image: traefik:v3
        command: ["--api.insecure=true", "--providers.docker"]
        restart: unless-stopped
        ports:
          - "80:80/tcp"
          - "8080:8080/tcp"
        volumes:
          - /var/run/docker.sock:/var/run/docker.sock:ro
        labels:
          - "traefik.enable=true"
  "#};

	let mut project = Project::default();
	project.import_template(input)?;

	assert_eq!(serialize(&project), input);

	Ok(())
}

#[test]
fn padded_service_names_are_routed() -> Result<(), Box<dyn std::error::Error>> {
	let project = Project {
		services: vec![ServiceConfig {
			name: " web".to_string(),
			..web()
		}],
		vpn: VpnConfig {
			enabled: true,
			provider: Some(VpnProvider::Tailscale(TailscaleConfig::default())),
			services_using_vpn: vec!["web".to_string()],
			..Default::default()
		},
		..Default::default()
	};

	let parsed: serde_yaml_ng::Value = serde_yaml_ng::from_str(&serialize(&project))?;
	let web = &parsed["services"]["web"];

	assert!(web.get("ports").is_none());
	assert_eq!(web["network_mode"].as_str(), Some("service:tailscale"));

	Ok(())
}
