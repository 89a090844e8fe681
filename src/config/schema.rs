//! Bootstrap document schema.
//!
//! Mirrors the subset of the service-mesh static bootstrap format that the
//! proxy consumes. Field names follow the document verbatim; anything not
//! listed here is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// Root of the bootstrap document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Bootstrap {
    /// Admin surface address. Optional; no admin listener without it.
    #[serde(default)]
    pub admin: Option<AdminSection>,

    /// Listeners and clusters.
    pub static_resources: StaticResources,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminSection {
    pub address: Address,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticResources {
    pub listeners: Vec<ListenerSpec>,
    pub clusters: Vec<ClusterSpec>,
}

/// `address: { socket_address: { address, port_value } }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Address {
    pub socket_address: SocketAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SocketAddress {
    pub address: String,
    pub port_value: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenerSpec {
    pub name: String,
    pub address: Address,
    #[serde(default)]
    pub filter_chains: Vec<FilterChainSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterChainSpec {
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub name: String,
    pub typed_config: TypedConfigSpec,
}

/// The HTTP connection manager config; only the route table is consulted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TypedConfigSpec {
    #[serde(default)]
    pub stat_prefix: Option<String>,
    pub route_config: RouteConfigSpec,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfigSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub virtual_hosts: Vec<VirtualHostSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VirtualHostSpec {
    pub name: String,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteSpec {
    #[serde(rename = "match")]
    pub match_: RouteMatchSpec,
    pub route: RouteActionSpec,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteMatchSpec {
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteActionSpec {
    pub cluster: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClusterSpec {
    pub name: String,

    /// Duration string such as `"0.25s"` or `"250ms"`.
    #[serde(default)]
    pub connect_timeout: Option<String>,

    /// `ROUND_ROBIN`, `LEAST_CONNECTIONS`; anything else means round robin.
    #[serde(default)]
    pub lb_policy: Option<String>,

    #[serde(default)]
    pub load_assignment: LoadAssignmentSpec,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoadAssignmentSpec {
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub endpoints: Vec<LocalityEndpointsSpec>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LocalityEndpointsSpec {
    #[serde(default)]
    pub lb_endpoints: Vec<LbEndpointSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LbEndpointSpec {
    pub endpoint: EndpointSpec,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointSpec {
    pub address: Address,
}
