//! Interface add / change / delete handling
//!
//! The interface event is always enabled and never goes through the decoder's
//! handler check. Besides any registered listener it drives interface
//! creation, protocol reset and default teardown on the host.

use crate::errors::DropReason;
use crate::event_processing::EventDispatcher;
use fweh_common::{DisplayMac, EventMessage, IfAction, IfEvent};
use log::{debug, error, warn};
use std::sync::atomic::Ordering;

/// What the interface event led to; mainly for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfEventOutcome {
    /// Payload too short to hold an interface event.
    Malformed,
    /// Placeholder without a real interface behind it.
    Suppressed,
    InvalidIndex,
    AddFailed,
    NetAttachFailed,
    Handled(Option<IfAction>),
}

impl EventDispatcher {
    pub(crate) fn handle_if_event(
        &self,
        fw_code: u32,
        emsg: &EventMessage,
        data: &[u8],
    ) -> IfEventOutcome {
        let Some(ifevent) = IfEvent::from_bytes(data) else {
            error!("interface event payload too short: {} bytes", data.len());
            self.stats.record_drop(DropReason::Truncated);
            return IfEventOutcome::Malformed;
        };

        debug!(
            "action: {} ifidx: {} bsscfgidx: {} flags: {} role: {}",
            ifevent.action, ifevent.ifidx, ifevent.bsscfgidx, ifevent.flags, ifevent.role
        );

        let is_p2pdev =
            ifevent.is_p2p_device(self.p2pdev_setup_ongoing.load(Ordering::Acquire));
        if !is_p2pdev && ifevent.is_noif() {
            debug!("event can be ignored");
            self.stats.record_suppressed_interface_event();
            return IfEventOutcome::Suppressed;
        }

        if ifevent.ifidx as usize >= self.max_interfaces {
            error!("invalid interface index: {}", ifevent.ifidx);
            self.stats.record_drop(DropReason::InvalidInterface);
            return IfEventOutcome::InvalidIndex;
        }
        if ifevent.bsscfgidx as usize >= self.max_interfaces {
            error!("invalid bsscfg index: {}", ifevent.bsscfgidx);
            self.stats.record_drop(DropReason::InvalidInterface);
            return IfEventOutcome::InvalidIndex;
        }

        let action = ifevent.action();
        let mut ifp = self.host.interface(ifevent.bsscfgidx);

        if action == Some(IfAction::Add) {
            debug!(
                "adding {} ({})",
                emsg.ifname_as_str(),
                DisplayMac(&emsg.addr)
            );
            let created = match self.host.add_interface(
                ifevent.bsscfgidx,
                ifevent.ifidx,
                is_p2pdev,
                emsg.ifname_as_str(),
                emsg.addr,
            ) {
                Ok(created) => created,
                Err(err) => {
                    warn!("{err}");
                    return IfEventOutcome::AddFailed;
                }
            };

            if !is_p2pdev {
                self.host.proto_add_if(&created);
            }
            if !self.registry().is_registered(fw_code) {
                if let Err(err) = self.host.net_attach(&created, false) {
                    error!("{err}");
                    return IfEventOutcome::NetAttachFailed;
                }
            }
            ifp = Some(created);
        }

        if let (Some(ifp), Some(IfAction::Change)) = (ifp.as_deref(), action) {
            self.host.proto_reset_if(ifp);
        }

        if self.registry().is_registered(fw_code) {
            if let Err(err) = self.call_event_handler(ifp.as_deref(), fw_code, emsg, data) {
                error!("interface event handler failed: {err}");
            }
        }

        if let (Some(ifp), Some(IfAction::Del)) = (ifp.as_deref(), action) {
            if self.host.is_delete_waiter_armed(ifp) {
                debug!("deletion of {} left to armed waiter", ifp.name);
            } else {
                self.host.remove_interface(ifp, false);
            }
        }

        IfEventOutcome::Handled(action)
    }
}
