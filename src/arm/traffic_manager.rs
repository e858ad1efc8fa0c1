//! # Traffic Manager Resource Records
//!
//! Records for `Microsoft.Network/trafficManagerProfiles`. Endpoints are
//! nested inside the profile's property bag rather than emitted as
//! top-level resources; the profile's dependency set is the resourceIds of
//! the Azure websites its endpoints target.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::arm::{envelope, ArmResource};
use crate::core::{ArmExpression, Location, ResourceName, ResourceType, Tags};

pub const PROFILES: ResourceType = ResourceType {
    path: "Microsoft.Network/trafficManagerProfiles",
    api_version: "2018-04-01",
};

pub const WEBSITES: ResourceType = ResourceType {
    path: "Microsoft.Web/sites",
    api_version: "2020-06-01",
};

const AZURE_ENDPOINT_TYPE: &str = "Microsoft.Network/trafficManagerProfiles/azureEndpoints";
const EXTERNAL_ENDPOINT_TYPE: &str = "Microsoft.Network/trafficManagerProfiles/externalEndpoints";

/// How the profile routes traffic across endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RoutingMethod {
    #[default]
    Performance,
    Weighted,
    Priority,
    Geographic,
}

/// Probe protocol for endpoint health monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MonitorProtocol {
    Http,
    #[default]
    Https,
}

impl MonitorProtocol {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorProtocol::Http => "HTTP",
            MonitorProtocol::Https => "HTTPS",
        }
    }
}

/// What an endpoint routes to. The endpoint's rendered location is derived
/// from this: external targets carry their own location, website targets
/// resolve through `targetResourceId` and render none.
#[derive(Debug, Clone, PartialEq)]
pub enum EndpointTarget {
    External { dns_name: String, location: Location },
    Website(ResourceName),
}

/// One endpoint nested in a profile's property bag.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub name: ResourceName,
    pub target: EndpointTarget,
    pub enabled: bool,
    pub weight: Option<u32>,
    pub priority: Option<u32>,
}

impl Endpoint {
    /// The website this endpoint depends on, if any.
    #[must_use]
    pub fn dependency(&self) -> Option<ArmExpression> {
        match &self.target {
            EndpointTarget::Website(site) => Some(WEBSITES.resource_id(site)),
            EndpointTarget::External { .. } => None,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        properties.insert(
            "endpointStatus".to_owned(),
            if self.enabled { "Enabled" } else { "Disabled" }.into(),
        );
        if let Some(weight) = self.weight {
            properties.insert("weight".to_owned(), weight.into());
        }
        if let Some(priority) = self.priority {
            properties.insert("priority".to_owned(), priority.into());
        }
        let endpoint_type = match &self.target {
            EndpointTarget::External { dns_name, location } => {
                properties.insert("target".to_owned(), dns_name.clone().into());
                properties.insert("endpointLocation".to_owned(), location.as_str().into());
                EXTERNAL_ENDPOINT_TYPE
            }
            EndpointTarget::Website(site) => {
                properties.insert(
                    "targetResourceId".to_owned(),
                    WEBSITES.resource_id(site).eval().into(),
                );
                AZURE_ENDPOINT_TYPE
            }
        };
        json!({
            "name": self.name.as_str(),
            "type": endpoint_type,
            "properties": Value::Object(properties),
        })
    }
}

/// Health-probe settings rendered as `monitorConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub protocol: MonitorProtocol,
    pub port: u16,
    pub path: String,
    pub interval_in_seconds: u64,
    pub timeout_in_seconds: u64,
    pub tolerated_number_of_failures: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            protocol: MonitorProtocol::Https,
            port: 443,
            path: "/".to_owned(),
            interval_in_seconds: 30,
            timeout_in_seconds: 10,
            tolerated_number_of_failures: 3,
        }
    }
}

/// The Traffic Manager profile resource. Always located in `"global"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: ResourceName,
    pub dns_ttl: u64,
    pub enabled: bool,
    pub routing_method: RoutingMethod,
    pub traffic_view_enabled: bool,
    pub monitor: MonitorConfig,
    pub endpoints: Vec<Endpoint>,
    pub tags: Tags,
}

impl ArmResource for Profile {
    fn resource_type(&self) -> ResourceType {
        PROFILES
    }

    fn resource_name(&self) -> ResourceName {
        self.name.clone()
    }

    fn depends_on(&self) -> Vec<ArmExpression> {
        self.endpoints
            .iter()
            .filter_map(Endpoint::dependency)
            .collect()
    }

    fn to_json(&self) -> Value {
        let status = |enabled: bool| if enabled { "Enabled" } else { "Disabled" };
        let properties = json!({
            "profileStatus": status(self.enabled),
            "trafficRoutingMethod": serde_json::to_value(self.routing_method)
                .unwrap_or_else(|_| json!(null)),
            "trafficViewEnrollmentStatus": status(self.traffic_view_enabled),
            "dnsConfig": {
                "relativeName": self.name.as_str(),
                "ttl": self.dns_ttl,
            },
            "monitorConfig": {
                "protocol": self.monitor.protocol.as_str(),
                "port": self.monitor.port,
                "path": self.monitor.path,
                "intervalInSeconds": self.monitor.interval_in_seconds,
                "timeoutInSeconds": self.monitor.timeout_in_seconds,
                "toleratedNumberOfFailures": self.monitor.tolerated_number_of_failures,
            },
            "endpoints": self.endpoints.iter().map(Endpoint::to_json).collect::<Vec<_>>(),
        });
        envelope(
            PROFILES,
            &self.name,
            Some(&Location::global()),
            &self.depends_on(),
            &self.tags,
            properties,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn external_endpoint() -> Endpoint {
        Endpoint {
            name: ResourceName::from("eu"),
            target: EndpointTarget::External {
                dns_name: "eu.example.com".to_owned(),
                location: Location::new("westeurope"),
            },
            enabled: true,
            weight: Some(1),
            priority: Some(1),
        }
    }

    #[test]
    fn external_endpoint_copies_location_from_target() {
        let json = external_endpoint().to_json();
        assert_eq!(
            json["type"],
            json!("Microsoft.Network/trafficManagerProfiles/externalEndpoints")
        );
        assert_eq!(json["properties"]["target"], json!("eu.example.com"));
        assert_eq!(json["properties"]["endpointLocation"], json!("westeurope"));
    }

    #[test]
    fn website_endpoint_renders_target_resource_id_and_no_location() {
        let endpoint = Endpoint {
            name: ResourceName::from("app"),
            target: EndpointTarget::Website(ResourceName::from("my-site")),
            enabled: true,
            weight: None,
            priority: None,
        };
        let json = endpoint.to_json();
        assert_eq!(
            json["type"],
            json!("Microsoft.Network/trafficManagerProfiles/azureEndpoints")
        );
        assert_eq!(
            json["properties"]["targetResourceId"],
            json!("[resourceId('Microsoft.Web/sites', 'my-site')]")
        );
        assert!(json["properties"].get("endpointLocation").is_none());
        assert_eq!(
            endpoint.dependency().unwrap().eval(),
            "[resourceId('Microsoft.Web/sites', 'my-site')]"
        );
    }

    #[test]
    fn disabled_endpoint_renders_disabled_status() {
        let mut endpoint = external_endpoint();
        endpoint.enabled = false;
        assert_eq!(
            endpoint.to_json()["properties"]["endpointStatus"],
            json!("Disabled")
        );
    }
}
