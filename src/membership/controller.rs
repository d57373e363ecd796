use rand::Rng;
use tracing::{info, warn};

use super::protocol::{AdminRequest, parse_member_address};
use crate::cluster::NodeRegistry;
use crate::error::{MembershipError, QuorumError};
use crate::transport::Transport;

/// Failure injection never leaves fewer servers than this.
pub const MIN_QUORUM: usize = 3;

pub struct MembershipController {
    transport: Transport,
}

impl MembershipController {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Returns the coordinating node's view of the group, verbatim.
    pub async fn list_members(&self, registry: &NodeRegistry) -> Result<String, MembershipError> {
        let coordinator = registry.coordinator().ok_or(MembershipError::NoCoordinator)?;
        let response = self
            .transport
            .send(coordinator, &AdminRequest::ListMembers.encode())
            .await?;

        Ok(String::from_utf8_lossy(&response).into_owned())
    }

    /// Tells the coordinating node that `address` has left the group, then drops it from
    /// the local view if it is there.
    ///
    /// # Returns
    /// * `true` if the node was removed from the view and its connection closed. The last
    ///   node of the view is never removed.
    pub async fn leave(
        &self,
        registry: &mut NodeRegistry,
        address: &str,
    ) -> Result<bool, MembershipError> {
        let address = parse_member_address(address)
            .ok_or_else(|| MembershipError::InvalidAddress(address.to_string()))?;
        let request = AdminRequest::Leave {
            address: address.clone(),
        };
        self.announce(registry, request).await?;

        let Some(index) = registry.position(&address) else {
            return Ok(false);
        };
        if registry.len() == 1 {
            warn!("{} left the group but is the only server in view; keeping it", address);
            return Ok(false);
        }

        if let Some(node) = registry.remove(index) {
            node.connection().close().await;
        }
        info!(
            "Removed {} from the view ({} server(s) remain)",
            address,
            registry.len()
        );
        Ok(true)
    }

    /// Tells the coordinating node that `address` has rejoined the group.
    pub async fn rejoin(
        &self,
        registry: &NodeRegistry,
        address: &str,
    ) -> Result<(), MembershipError> {
        let address = parse_member_address(address)
            .ok_or_else(|| MembershipError::InvalidAddress(address.to_string()))?;
        self.announce(registry, AdminRequest::Rejoin { address }).await
    }

    async fn announce(
        &self,
        registry: &NodeRegistry,
        request: AdminRequest,
    ) -> Result<(), MembershipError> {
        let coordinator = registry.coordinator().ok_or(MembershipError::NoCoordinator)?;
        self.transport.send_only(coordinator, &request.encode()).await?;
        info!("Sent '{}' to {}", request, coordinator.address());
        Ok(())
    }

    /// Drops the connection to a uniformly random node and removes it from the view.
    ///
    /// # Returns
    /// * The removed node's address.
    /// * `QuorumError` if the view holds `MIN_QUORUM` nodes or fewer. Nothing changes then.
    pub async fn inject_failure(
        &self,
        registry: &mut NodeRegistry,
    ) -> Result<String, QuorumError> {
        check_quorum(registry)?;
        let index = rand::thread_rng().gen_range(0..registry.len());
        self.drop_node(registry, index).await
    }

    /// `inject_failure` with a caller-supplied random source.
    pub async fn inject_failure_with<R>(
        &self,
        registry: &mut NodeRegistry,
        rng: &mut R,
    ) -> Result<String, QuorumError>
    where
        R: Rng + ?Sized,
    {
        check_quorum(registry)?;
        let index = rng.gen_range(0..registry.len());
        self.drop_node(registry, index).await
    }

    async fn drop_node(
        &self,
        registry: &mut NodeRegistry,
        index: usize,
    ) -> Result<String, QuorumError> {
        let node = registry.remove(index).ok_or(QuorumError {
            current: registry.len(),
            minimum: MIN_QUORUM,
        })?;
        node.connection().close().await;

        warn!(
            "Dropped connection to {} ({} server(s) remain)",
            node.address(),
            registry.len()
        );
        Ok(node.address().to_string())
    }

    /// Connects to a rejoined `address` and appends it to the view.
    pub async fn reconnect(
        &self,
        registry: &mut NodeRegistry,
        address: &str,
    ) -> Result<(), MembershipError> {
        let address = parse_member_address(address)
            .ok_or_else(|| MembershipError::InvalidAddress(address.to_string()))?;
        if registry.position(&address).is_some() {
            return Err(MembershipError::AlreadyPresent(address));
        }

        let node = self.transport.connect(&address).await?;
        registry.append(node);
        info!(
            "Reconnected to {} ({} server(s) in view)",
            address,
            registry.len()
        );
        Ok(())
    }
}

fn check_quorum(registry: &NodeRegistry) -> Result<(), QuorumError> {
    if registry.len() <= MIN_QUORUM {
        return Err(QuorumError {
            current: registry.len(),
            minimum: MIN_QUORUM,
        });
    }
    Ok(())
}
