use crate::content::ContentBlock;
use crate::tool::{ArgumentBag, ToolDefinition, ToolError, ToolHandler};
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use toolforge_core::{CollisionPolicy, RegistryConfig};
use tracing::{debug, info, warn};

pub type SharedTool = Arc<dyn ToolHandler>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("Tool name must not be empty")]
    EmptyName,
}

/// Name-keyed set of handlers, kept in registration order.
///
/// This is the populate-phase view: build it, register every handler, then
/// [`freeze`](ToolRegistry::freeze) it into a [`ToolService`] for dispatch.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<SharedTool>,
    index: HashMap<String, usize>,
    config: RegistryConfig,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn register_tool<T>(&mut self, tool: T) -> Result<(), RegistryError>
    where
        T: ToolHandler + 'static,
    {
        self.register_shared(Arc::new(tool))
    }

    /// Inserts `tool` under its name, resolving collisions with the configured policy.
    ///
    /// With [`CollisionPolicy::Replace`] the new handler takes over the old
    /// handler's position in the listing.
    pub fn register_shared(&mut self, tool: SharedTool) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        match self.index.get(&name) {
            Some(&position) => match self.config.collision {
                CollisionPolicy::Replace => {
                    warn!(tool = %name, "Replacing previously registered tool");
                    self.tools[position] = tool;
                }
                CollisionPolicy::Reject => {
                    return Err(RegistryError::DuplicateTool(name));
                }
            },
            None => {
                info!(tool = %name, "Registered tool");
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }

        Ok(())
    }

    pub fn get_tool(&self, name: &str) -> Option<SharedTool> {
        self.index
            .get(name)
            .map(|&position| Arc::clone(&self.tools[position]))
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|tool| tool.name().to_string()).collect()
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.get_schema()).collect()
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn freeze(self) -> ToolService {
        ToolService::new(self)
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .field("config", &self.config)
            .finish()
    }
}

/// Read-side handle over a registry snapshot: discovery and dispatch by name.
///
/// Cloning is cheap and every clone sees the same registry. Lookups never
/// block or suspend; the only await points are the optional concurrency
/// permit and the handler's own `execute`.
#[derive(Clone)]
pub struct ToolService {
    registry: Arc<ArcSwap<ToolRegistry>>,
    limiter: Option<Arc<Semaphore>>,
}

impl ToolService {
    pub fn new(registry: ToolRegistry) -> Self {
        // A bound of zero would block every call forever, so it means "unbounded".
        let limiter = registry
            .config
            .max_concurrent_calls
            .filter(|limit| *limit > 0)
            .map(|limit| Arc::new(Semaphore::new(limit)));

        Self {
            registry: Arc::new(ArcSwap::from_pointee(registry)),
            limiter,
        }
    }

    pub fn snapshot(&self) -> Arc<ToolRegistry> {
        self.registry.load_full()
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.registry.load().list_tools()
    }

    pub fn tool_count(&self) -> usize {
        self.registry.load().tool_count()
    }

    /// Registers a handler after startup by publishing a new snapshot.
    ///
    /// Calls already in flight keep the handler they looked up.
    pub fn register_tool<T>(&self, tool: T) -> Result<(), RegistryError>
    where
        T: ToolHandler + 'static,
    {
        let tool: SharedTool = Arc::new(tool);
        let mut outcome = Ok(());

        self.registry.rcu(|current| {
            let mut next = ToolRegistry::clone(current);
            outcome = next.register_shared(Arc::clone(&tool));
            match outcome {
                Ok(()) => Arc::new(next),
                Err(_) => Arc::clone(current),
            }
        });

        outcome
    }

    fn lookup(&self, name: &str) -> Result<SharedTool, ToolError> {
        self.registry
            .load()
            .get_tool(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    pub async fn execute_tool(
        &self,
        name: &str,
        arguments: ArgumentBag,
    ) -> Result<Vec<ContentBlock>, ToolError> {
        let tool = self.lookup(name)?;
        self.dispatch(tool, name, arguments).await
    }

    async fn dispatch(
        &self,
        tool: SharedTool,
        name: &str,
        arguments: ArgumentBag,
    ) -> Result<Vec<ContentBlock>, ToolError> {
        let _permit = match &self.limiter {
            Some(limiter) => Some(
                Arc::clone(limiter)
                    .acquire_owned()
                    .await
                    .map_err(|e| ToolError::execution(name, e))?,
            ),
            None => None,
        };

        debug!(tool = %name, "Executing tool");
        let result = tool.execute(arguments).await;

        if let Err(error) = &result {
            warn!(tool = %name, %error, "Tool call failed");
        }

        result
    }

    /// Like [`execute_tool`](ToolService::execute_tool), but abandons the call
    /// when `cancel` fires. The handler future is dropped, releasing whatever it
    /// held, and no partial output is returned. Unknown names are reported as
    /// such whether or not `cancel` has fired.
    pub async fn execute_tool_with_cancel(
        &self,
        name: &str,
        arguments: ArgumentBag,
        cancel: &CancellationToken,
    ) -> Result<Vec<ContentBlock>, ToolError> {
        let tool = self.lookup(name)?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(tool = %name, "Tool call cancelled");
                Err(ToolError::Cancelled { tool_name: name.to_string() })
            }
            result = self.dispatch(tool, name, arguments) => result,
        }
    }
}

impl fmt::Debug for ToolService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolService")
            .field("tools", &self.registry.load().tool_names())
            .field("bounded", &self.limiter.is_some())
            .finish()
    }
}
