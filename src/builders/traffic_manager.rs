//! # Traffic Manager Builder
//!
//! Accumulates profile and endpoint options and projects them into a
//! [`Profile`] record. Unlike the vault builder there is no cross-field
//! invariant to check: endpoints carry their target from construction, so
//! finalization cannot fail and `build()` returns the record directly.

use tracing::debug;

use crate::arm::traffic_manager::{
    Endpoint, EndpointTarget, MonitorConfig, MonitorProtocol, Profile, RoutingMethod,
};
use crate::core::{merge_tags, Location, ResourceName, Seconds, Tags};

/// One endpoint under construction. The target is mandatory at
/// construction, so an endpoint without one cannot exist.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointConfig {
    name: ResourceName,
    target: EndpointTarget,
    enabled: bool,
    weight: Option<u32>,
    priority: Option<u32>,
}

impl EndpointConfig {
    #[must_use]
    pub fn new(name: impl Into<ResourceName>, target: EndpointTarget) -> Self {
        EndpointConfig {
            name: name.into(),
            target,
            enabled: true,
            weight: None,
            priority: None,
        }
    }

    /// An endpoint routing to an external DNS name. The rendered endpoint
    /// location is copied from the target's location.
    #[must_use]
    pub fn external(
        name: impl Into<ResourceName>,
        dns_name: impl Into<String>,
        location: impl Into<Location>,
    ) -> Self {
        EndpointConfig::new(
            name,
            EndpointTarget::External {
                dns_name: dns_name.into(),
                location: location.into(),
            },
        )
    }

    /// An endpoint routing to an Azure website in the same deployment.
    #[must_use]
    pub fn website(name: impl Into<ResourceName>, site: impl Into<ResourceName>) -> Self {
        EndpointConfig::new(name, EndpointTarget::Website(site.into()))
    }

    #[must_use]
    pub fn weight(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn disable(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[must_use]
    pub fn enable(mut self) -> Self {
        self.enabled = true;
        self
    }

    fn into_endpoint(self) -> Endpoint {
        Endpoint {
            name: self.name,
            target: self.target,
            enabled: self.enabled,
            weight: self.weight,
            priority: self.priority,
        }
    }
}

/// Accumulating configuration record for a Traffic Manager profile.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficManagerBuilder {
    name: ResourceName,
    dns_ttl: Seconds,
    enabled: bool,
    routing_method: RoutingMethod,
    traffic_view_enabled: bool,
    monitor: MonitorConfig,
    endpoints: Vec<EndpointConfig>,
    tags: Tags,
}

impl TrafficManagerBuilder {
    /// Start a profile configuration with the documented defaults: DNS TTL
    /// 30 seconds, Performance routing, profile enabled, traffic view
    /// disabled, HTTPS monitoring on port 443 at path "/".
    #[must_use]
    pub fn new(name: impl Into<ResourceName>) -> Self {
        TrafficManagerBuilder {
            name: name.into(),
            dns_ttl: Seconds(30),
            enabled: true,
            routing_method: RoutingMethod::Performance,
            traffic_view_enabled: false,
            monitor: MonitorConfig::default(),
            endpoints: Vec::new(),
            tags: Tags::new(),
        }
    }

    /// Set the DNS TTL. Accepts whole seconds or a
    /// [`std::time::Duration`]; both normalize identically.
    #[must_use]
    pub fn dns_ttl(mut self, ttl: impl Into<Seconds>) -> Self {
        self.dns_ttl = ttl.into();
        self
    }

    #[must_use]
    pub fn routing_method(mut self, method: RoutingMethod) -> Self {
        self.routing_method = method;
        self
    }

    #[must_use]
    pub fn enable_traffic_view(mut self) -> Self {
        self.traffic_view_enabled = true;
        self
    }

    #[must_use]
    pub fn disable_traffic_view(mut self) -> Self {
        self.traffic_view_enabled = false;
        self
    }

    #[must_use]
    pub fn disable_profile(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[must_use]
    pub fn enable_profile(mut self) -> Self {
        self.enabled = true;
        self
    }

    #[must_use]
    pub fn monitor_protocol(mut self, protocol: MonitorProtocol) -> Self {
        self.monitor.protocol = protocol;
        self
    }

    #[must_use]
    pub fn monitor_port(mut self, port: u16) -> Self {
        self.monitor.port = port;
        self
    }

    #[must_use]
    pub fn monitor_path(mut self, path: impl Into<String>) -> Self {
        self.monitor.path = path.into();
        self
    }

    #[must_use]
    pub fn monitor_interval(mut self, interval: impl Into<Seconds>) -> Self {
        self.monitor.interval_in_seconds = interval.into().0;
        self
    }

    #[must_use]
    pub fn monitor_timeout(mut self, timeout: impl Into<Seconds>) -> Self {
        self.monitor.timeout_in_seconds = timeout.into().0;
        self
    }

    #[must_use]
    pub fn tolerated_failures(mut self, failures: u32) -> Self {
        self.monitor.tolerated_number_of_failures = failures;
        self
    }

    #[must_use]
    pub fn add_endpoint(mut self, endpoint: EndpointConfig) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Fold of [`TrafficManagerBuilder::add_endpoint`] over every element.
    #[must_use]
    pub fn add_endpoints(self, endpoints: impl IntoIterator<Item = EndpointConfig>) -> Self {
        endpoints
            .into_iter()
            .fold(self, TrafficManagerBuilder::add_endpoint)
    }

    #[must_use]
    pub fn add_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn add_tags(mut self, tags: impl IntoIterator<Item = (String, String)>) -> Self {
        merge_tags(&mut self.tags, tags);
        self
    }

    /// Finalize into the profile record. Endpoint locations and the
    /// profile's dependency set derive from each endpoint's target.
    #[must_use]
    pub fn build(self) -> Profile {
        debug!(
            profile = %self.name,
            endpoints = self.endpoints.len(),
            "finalizing traffic manager configuration"
        );
        Profile {
            name: self.name,
            dns_ttl: self.dns_ttl.0,
            enabled: self.enabled,
            routing_method: self.routing_method,
            traffic_view_enabled: self.traffic_view_enabled,
            monitor: self.monitor,
            endpoints: self
                .endpoints
                .into_iter()
                .map(EndpointConfig::into_endpoint)
                .collect(),
            tags: self.tags,
        }
    }
}
