use async_trait::async_trait;
use fleetform_cloud::{CloudError, Provider, Result};
use fleetform_cloud_huawei::cci::api::{Metadata, NamespaceStatus};
use fleetform_cloud_huawei::cci::{Namespace, NamespaceApi, NamespaceResource};
use fleetform_cloud_huawei::vpc::{
    LegacyRoute, Route, RouteApi, RouteOperation, RouteTable, RouteTableApi,
    RouteTableRouteResource,
};
use fleetform_cloud_huawei::{ClientFactory, PollTiming};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const REGION: &str = "cn-north-4";

/// In-memory cloud shared by every client it hands out
#[derive(Clone, Default)]
pub struct MockCloud {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
pub struct MockState {
    pub namespaces: BTreeMap<String, Namespace>,
    /// Phases reported by successive namespace `get` calls; "404" deletes it
    pub phase_script: VecDeque<&'static str>,
    pub route_tables: BTreeMap<String, RouteTable>,
    pub legacy_routes: BTreeMap<String, LegacyRoute>,
    /// Accept route additions without ever listing them
    pub stall_route_adds: bool,
    /// Every API call, e.g. "cci.create" or "vpc.update rtb-1 add"
    pub calls: Vec<String>,
    pub clients_created: usize,
}

impl MockCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    #[allow(dead_code)]
    pub fn script_phases(&self, phases: &[&'static str]) {
        self.state().phase_script.extend(phases.iter().copied());
    }

    #[allow(dead_code)]
    pub fn add_namespace(&self, name: &str, uid: &str, phase: &str) {
        let namespace = Namespace {
            kind: "Namespace".to_string(),
            api_version: "v1".to_string(),
            metadata: Metadata {
                name: name.to_string(),
                uid: Some(uid.to_string()),
                creation_timestamp: Some("2024-05-01T08:00:00Z".to_string()),
                ..Metadata::default()
            },
            status: Some(NamespaceStatus {
                phase: phase.to_string(),
            }),
        };
        self.state().namespaces.insert(name.to_string(), namespace);
    }

    #[allow(dead_code)]
    pub fn add_route_table(&self, id: &str, name: &str, vpc_id: &str, default: bool) {
        let table = RouteTable {
            id: Some(id.to_string()),
            name: name.to_string(),
            vpc_id: vpc_id.to_string(),
            default,
            routes: Vec::new(),
        };
        self.state().route_tables.insert(id.to_string(), table);
    }

    #[allow(dead_code)]
    pub fn add_route(&self, table_id: &str, destination: &str, nexthop: &str) {
        let route = Route {
            route_type: "ecs".to_string(),
            destination: destination.to_string(),
            nexthop: nexthop.to_string(),
            description: None,
        };
        if let Some(table) = self.state().route_tables.get_mut(table_id) {
            table.routes.push(route);
        }
    }

    #[allow(dead_code)]
    pub fn add_legacy_route(&self, id: &str, destination: &str, vpc_id: &str) {
        let route = LegacyRoute {
            id: id.to_string(),
            destination: destination.to_string(),
            vpc_id: vpc_id.to_string(),
            route_type: "ecs".to_string(),
            nexthop: "i-1".to_string(),
        };
        self.state().legacy_routes.insert(id.to_string(), route);
    }

    #[allow(dead_code)]
    pub fn routes(&self, table_id: &str) -> Vec<Route> {
        self.state()
            .route_tables
            .get(table_id)
            .map(|t| t.routes.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: impl Into<String>) {
        self.state().calls.push(call.into());
    }
}

impl ClientFactory for MockCloud {
    fn default_region(&self) -> &str {
        REGION
    }

    fn default_enterprise_project_id(&self) -> Option<&str> {
        Some("0")
    }

    fn namespace_api(&self, _region: &str) -> Result<Arc<dyn NamespaceApi>> {
        self.state().clients_created += 1;
        Ok(Arc::new(self.clone()))
    }

    fn route_table_api(&self, _region: &str) -> Result<Arc<dyn RouteTableApi>> {
        self.state().clients_created += 1;
        Ok(Arc::new(self.clone()))
    }

    fn route_api(&self, _region: &str) -> Result<Arc<dyn RouteApi>> {
        self.state().clients_created += 1;
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl NamespaceApi for MockCloud {
    async fn create(&self, request: &Namespace) -> Result<Namespace> {
        self.record("cci.create");
        let mut namespace = request.clone();
        namespace.metadata.uid = Some(format!("uid-{}", request.metadata.name));
        namespace.metadata.creation_timestamp = Some("2024-05-01T08:00:00Z".to_string());
        namespace.status = Some(NamespaceStatus {
            phase: "Pending".to_string(),
        });
        self.state()
            .namespaces
            .insert(request.metadata.name.clone(), namespace.clone());
        Ok(namespace)
    }

    async fn get(&self, name: &str) -> Result<Namespace> {
        self.record(format!("cci.get {}", name));
        let mut state = self.state();
        match state.phase_script.pop_front() {
            Some("404") => {
                state.namespaces.remove(name);
            }
            Some(phase) => {
                if let Some(ns) = state.namespaces.get_mut(name) {
                    ns.status = Some(NamespaceStatus {
                        phase: phase.to_string(),
                    });
                }
            }
            None => {}
        }
        state
            .namespaces
            .get(name)
            .cloned()
            .ok_or_else(|| CloudError::NotFound(format!("namespace {}", name)))
    }

    async fn list(&self) -> Result<Vec<Namespace>> {
        self.record("cci.list");
        Ok(self.state().namespaces.values().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.record(format!("cci.delete {}", name));
        let mut state = self.state();
        match state.namespaces.get_mut(name) {
            Some(ns) => {
                ns.status = Some(NamespaceStatus {
                    phase: "Terminating".to_string(),
                });
                Ok(())
            }
            None => Err(CloudError::NotFound(format!("namespace {}", name))),
        }
    }
}

#[async_trait]
impl RouteTableApi for MockCloud {
    async fn get(&self, id: &str) -> Result<RouteTable> {
        self.record(format!("vpc.get {}", id));
        self.state()
            .route_tables
            .get(id)
            .cloned()
            .ok_or_else(|| CloudError::NotFound(format!("route table {}", id)))
    }

    async fn list(&self, vpc_id: &str) -> Result<Vec<RouteTable>> {
        self.record(format!("vpc.list {}", vpc_id));
        Ok(self
            .state()
            .route_tables
            .values()
            .filter(|t| t.vpc_id == vpc_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: &str, operations: &[RouteOperation]) -> Result<RouteTable> {
        for operation in operations {
            self.record(format!("vpc.update {} {}", id, operation.kind()));
        }

        let mut state = self.state();
        let stall_adds = state.stall_route_adds;
        let table = state
            .route_tables
            .get_mut(id)
            .ok_or_else(|| CloudError::NotFound(format!("route table {}", id)))?;

        for operation in operations {
            let opts = operation.route();
            let route = Route {
                route_type: opts.route_type.clone(),
                destination: opts.destination.clone(),
                nexthop: opts.nexthop.clone(),
                description: opts.description.clone(),
            };
            match operation {
                RouteOperation::Add(_) if stall_adds => {}
                RouteOperation::Add(_) => table.routes.push(route),
                RouteOperation::Modify(_) => {
                    if let Some(existing) = table
                        .routes
                        .iter_mut()
                        .find(|r| r.destination == route.destination)
                    {
                        *existing = route;
                    }
                }
                RouteOperation::Delete(_) => {
                    table.routes.retain(|r| r.destination != route.destination)
                }
            }
        }

        Ok(table.clone())
    }
}

#[async_trait]
impl RouteApi for MockCloud {
    async fn get_route(&self, id: &str) -> Result<LegacyRoute> {
        self.record(format!("route.get {}", id));
        self.state()
            .legacy_routes
            .get(id)
            .cloned()
            .ok_or_else(|| CloudError::NotFound(format!("route {}", id)))
    }
}

pub fn fast_timing() -> PollTiming {
    PollTiming::new(Duration::ZERO, Duration::from_millis(2))
}

/// Provider over the mock cloud with millisecond poll intervals
pub fn provider(cloud: &MockCloud) -> Provider<dyn ClientFactory> {
    let factory: Arc<dyn ClientFactory> = Arc::new(cloud.clone());
    Provider::new("huaweicloud", factory)
        .with_resource(Arc::new(NamespaceResource::new().with_timing(fast_timing())))
        .with_resource(Arc::new(RouteTableRouteResource::new().with_timing(fast_timing())))
}
