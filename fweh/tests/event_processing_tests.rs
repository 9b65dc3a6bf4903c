//! End-to-end tests for the firmware event engine
//!
//! Packets go in through `process_event`, the worker dispatches them, and the
//! tests observe handlers and the recording interface host. `detach` drains
//! the queue, so every assertion after it sees the final state.


use assert_matches::assert_matches;
use fweh::configuration::{EngineConfig, EventMapEntry, VendorConfig};
use fweh::{
    ConfiguredVendor, DefaultVendor, EventCode, Fweh, FwehError, HandlerError, IfAction, InterfaceHost,
};
use fweh_common::if_event::{IF_FLAG_NOIF, IF_ROLE_P2P_CLIENT, IF_ROLE_STA};
use fweh_common::IfEvent;
use std::sync::{Arc, Mutex};
use test_helpers::{packets, DeliveryLog, EventPacketBuilder, HostCall, RecordingFirmware, RecordingHost};

struct Harness {
    engine: Fweh,
    host: Arc<RecordingHost>,
    firmware: Arc<RecordingFirmware>,
}

impl Harness {
    fn new() -> Self {
        Self::with_vendor(Arc::new(DefaultVendor))
    }

    fn with_vendor(vendor: Arc<dyn fweh::VendorOps>) -> Self {
        let host = Arc::new(RecordingHost::with_primary());
        let firmware = Arc::new(RecordingFirmware::default());
        let engine = Fweh::attach(
            &EngineConfig::default(),
            vendor,
            Arc::clone(&host) as Arc<dyn InterfaceHost>,
            Arc::clone(&firmware) as Arc<dyn fweh::FirmwareIovar>,
        )
        .unwrap();
        Self {
            engine,
            host,
            firmware,
        }
    }

    fn feed(&self, packets: &[Vec<u8>]) {
        for packet in packets {
            self.engine.process_event(packet);
        }
    }

    fn finish(mut self) -> Self {
        self.engine.detach();
        self
    }
}

mod decode_rejection {
    use super::*;

    #[test]
    fn should_enqueue_nothing_for_out_of_range_event_type() {
        let harness = Harness::new();
        let log = DeliveryLog::default();
        harness.engine.register(EventCode::LINK, log.handler()).unwrap();

        harness.feed(&[
            EventPacketBuilder::new(128).build(),
            EventPacketBuilder::new(u32::MAX).build(),
        ]);

        let harness = harness.finish();
        let stats = harness.engine.stats();
        assert_eq!(stats.queued, 0);
        assert_eq!(stats.dropped.get("event_type_out_of_range"), Some(&2));
        assert!(log.deliveries().is_empty());
    }

    #[test]
    fn should_enqueue_nothing_for_oversized_or_overrunning_payload() {
        let harness = Harness::new();
        let log = DeliveryLog::default();
        harness.engine.register(EventCode::LINK, log.handler()).unwrap();

        harness.feed(&[
            EventPacketBuilder::event(EventCode::LINK)
                .payload(&vec![0; 8193])
                .build(),
            EventPacketBuilder::event(EventCode::LINK)
                .payload(&[1, 2, 3])
                .declared_len(4)
                .build(),
        ]);

        let harness = harness.finish();
        let stats = harness.engine.stats();
        assert_eq!(stats.queued, 0);
        assert_eq!(stats.dropped.get("payload_too_large"), Some(&1));
        assert_eq!(stats.dropped.get("payload_overrun"), Some(&1));
        assert!(log.deliveries().is_empty());
    }

    #[test]
    fn should_drop_event_without_handler_at_ingestion() {
        let harness = Harness::new();

        harness.feed(&[packets::link_up(0)]);

        let harness = harness.finish();
        assert_eq!(harness.engine.stats().dropped.get("no_handler"), Some(&1));
    }

    #[test]
    fn should_drop_truncated_packet() {
        let harness = Harness::new();
        let packet = packets::link_up(0);

        harness.engine.process_event(&packet[..40]);

        let harness = harness.finish();
        assert_eq!(harness.engine.stats().dropped.get("truncated"), Some(&1));
    }
}

mod delivery {
    use super::*;

    #[test]
    fn should_invoke_handlers_in_arrival_order() {
        let harness = Harness::new();
        let log = DeliveryLog::default();
        harness.engine.register(EventCode::LINK, log.handler()).unwrap();
        harness.engine.register(EventCode::ROAM, log.handler()).unwrap();

        let statuses: Vec<u32> = (0..50).collect();
        let batch: Vec<Vec<u8>> = statuses
            .iter()
            .map(|&status| {
                let code = if status % 2 == 0 { EventCode::LINK } else { EventCode::ROAM };
                packets::event_with_status(code, status)
            })
            .collect();
        harness.feed(&batch);

        harness.finish();
        assert_eq!(log.statuses(), statuses);
    }

    #[test]
    fn should_deliver_nothing_for_empty_sequence() {
        let harness = Harness::new();
        let log = DeliveryLog::default();
        harness.engine.register(EventCode::LINK, log.handler()).unwrap();

        harness.finish();

        assert!(log.deliveries().is_empty());
    }

    #[test]
    fn should_pass_payload_and_interface_to_handler() {
        let harness = Harness::new();
        let log = DeliveryLog::default();
        harness.engine.register(EventCode::LINK, log.handler()).unwrap();

        harness.feed(&[packets::link_up(0)]);

        harness.finish();
        let deliveries = log.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].ifname, "wlan0");
        assert_eq!(deliveries[0].code, EventCode::LINK);
        assert_eq!(deliveries[0].data, vec![0x01]);
    }

    #[test]
    fn should_route_tdls_peer_event_to_primary_interface() {
        let harness = Harness::new();
        let log = DeliveryLog::default();
        harness
            .engine
            .register(EventCode::TDLS_PEER_EVENT, log.handler())
            .unwrap();

        harness.feed(&[EventPacketBuilder::event(EventCode::TDLS_PEER_EVENT)
            .bsscfgidx(7)
            .build()]);

        harness.finish();
        assert_eq!(log.deliveries()[0].ifname, "wlan0");
    }

    #[test]
    fn should_keep_processing_after_handler_failure() {
        let harness = Harness::new();
        let log = DeliveryLog::default();
        harness
            .engine
            .register(
                EventCode::ROAM,
                fweh::handler_fn(|_, _, _| Err(HandlerError::Status(-5))),
            )
            .unwrap();
        harness.engine.register(EventCode::LINK, log.handler()).unwrap();

        harness.feed(&[
            packets::event_with_status(EventCode::ROAM, 1),
            packets::event_with_status(EventCode::LINK, 2),
        ]);

        let harness = harness.finish();
        assert_eq!(log.statuses(), vec![2]);
        assert_eq!(harness.engine.stats().handler_failures, 1);
    }
}

mod handler_panics {
    use super::*;

    #[test]
    fn should_deliver_later_events_after_handler_panics() {
        let harness = Harness::new();
        let log = DeliveryLog::default();
        harness
            .engine
            .register(
                EventCode::ROAM,
                fweh::handler_fn(|_, _, _| panic!("roam handler bug")),
            )
            .unwrap();
        harness.engine.register(EventCode::LINK, log.handler()).unwrap();

        harness.feed(&[packets::event_with_status(EventCode::ROAM, 1)]);
        let links: Vec<Vec<u8>> = (2..=6)
            .map(|status| packets::event_with_status(EventCode::LINK, status))
            .collect();
        harness.feed(&links);

        let harness = harness.finish();
        assert_eq!(log.statuses(), vec![2, 3, 4, 5, 6]);
        let stats = harness.engine.stats();
        assert_eq!(stats.handler_failures, 1);
        assert_eq!(stats.dispatched, 5);
        assert_eq!(harness.engine.queue_len(), 0);
    }

    #[test]
    fn should_keep_worker_running_after_interface_listener_panics() {
        let harness = Harness::new();
        let log = DeliveryLog::default();
        harness
            .engine
            .register(
                EventCode::IF,
                fweh::handler_fn(|_, _, _| panic!("listener bug")),
            )
            .unwrap();
        harness.engine.register(EventCode::LINK, log.handler()).unwrap();

        harness.feed(&[packets::interface(IfAction::Add, 2, "wlan2")]);
        harness.feed(&[packets::link_up(2)]);

        let harness = harness.finish();
        assert!(harness.host.has_interface(2));
        assert_eq!(log.deliveries().len(), 1);
        assert_eq!(log.deliveries()[0].ifname, "wlan2");
    }
}

mod registration {
    use super::*;

    #[test]
    fn should_keep_first_handler_on_conflict() {
        let harness = Harness::new();
        let first = DeliveryLog::default();
        let second = DeliveryLog::default();
        harness.engine.register(EventCode::LINK, first.handler()).unwrap();

        let result = harness.engine.register(EventCode::LINK, second.handler());
        harness.feed(&[packets::link_up(0)]);

        assert_matches!(result, Err(FwehError::AlreadyRegistered { code }) if code == EventCode::LINK);
        harness.finish();
        assert_eq!(first.deliveries().len(), 1);
        assert!(second.deliveries().is_empty());
    }

    #[test]
    fn should_treat_event_as_unhandled_after_unregister_race() {
        let harness = Harness::new();
        let log = DeliveryLog::default();
        harness.engine.register(EventCode::LINK, log.handler()).unwrap();
        let gate = Arc::new(Mutex::new(()));
        let held = gate.lock().unwrap();
        let blocker_gate = Arc::clone(&gate);
        harness
            .engine
            .register(
                EventCode::ROAM,
                fweh::handler_fn(move |_, _, _| {
                    let _wait = blocker_gate.lock().unwrap();
                    Ok(())
                }),
            )
            .unwrap();

        // The worker blocks in the ROAM handler while LINK is unregistered.
        harness.feed(&[
            packets::event_with_status(EventCode::ROAM, 0),
            packets::link_up(0),
        ]);
        harness.engine.unregister(EventCode::LINK);
        drop(held);

        let harness = harness.finish();
        assert!(log.deliveries().is_empty());
        let stats = harness.engine.stats();
        assert_eq!(stats.unhandled, 1);
        assert_eq!(stats.dispatched, 1);
    }
}

mod activation {
    use super::*;

    #[test]
    fn should_enable_exactly_registered_codes_and_interface_event() {
        let harness = Harness::new();
        harness
            .engine
            .register(EventCode::LINK, DeliveryLog::default().handler())
            .unwrap();
        harness
            .engine
            .register(EventCode::ESCAN_RESULT, DeliveryLog::default().handler())
            .unwrap();
        let primary = harness.host.interface(0).unwrap();

        harness.engine.activate_events(&primary).unwrap();

        let (name, mask) = harness.firmware.sets().remove(0);
        assert_eq!(name, "event_msgs");
        let set: Vec<u32> = (0..128u32)
            .filter(|&bit| mask[(bit / 8) as usize] & (1 << (bit % 8)) != 0)
            .collect();
        assert_eq!(set, vec![16, 54, 69]);
    }

    #[test]
    fn should_leave_firmware_untouched_on_detach() {
        let harness = Harness::new();
        let primary = harness.host.interface(0).unwrap();
        harness.engine.activate_events(&primary).unwrap();

        let harness = harness.finish();

        assert_eq!(harness.firmware.sets().len(), 1);
        assert_matches!(
            harness.engine.activate_events(&primary),
            Err(FwehError::Detached)
        );
    }
}

mod code_mapping {
    use super::*;

    #[test]
    fn should_translate_identically_without_map() {
        let harness = Harness::new();

        for code in [0u32, 16, 54, 92, 127, 4096] {
            assert_eq!(harness.engine.canonical_to_firmware(EventCode(code)), code);
            assert_eq!(harness.engine.firmware_to_canonical(code), EventCode(code));
        }
    }

    #[test]
    fn should_dispatch_remapped_code_under_canonical_name() {
        let vendor = ConfiguredVendor::new(
            &VendorConfig {
                name: "remapped".to_string(),
                event_map: vec![EventMapEntry {
                    code: EventCode::ESCAN_RESULT.as_u32(),
                    fw_code: 140,
                }],
            },
            160,
        );
        let harness = Harness::with_vendor(Arc::new(vendor));
        let log = DeliveryLog::default();
        harness
            .engine
            .register(EventCode::ESCAN_RESULT, log.handler())
            .unwrap();

        harness.feed(&[
            EventPacketBuilder::new(140).status(8).build(),
            EventPacketBuilder::new(69).status(9).build(),
        ]);

        harness.finish();
        let deliveries = log.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].code, EventCode::ESCAN_RESULT);
        assert_eq!(deliveries[0].status, 8);
    }
}

mod interface_lifecycle {
    use super::*;

    #[test]
    fn should_create_then_remove_interface_for_add_then_delete() {
        let harness = Harness::new();

        harness.feed(&[
            packets::interface(IfAction::Add, 3, "wlan3"),
            packets::interface(IfAction::Del, 3, "wlan3"),
        ]);

        let harness = harness.finish();
        let lifecycle: Vec<HostCall> = harness
            .host
            .calls()
            .into_iter()
            .filter(|call| matches!(call, HostCall::Add { .. } | HostCall::Remove(_)))
            .collect();
        assert_eq!(
            lifecycle,
            vec![
                HostCall::Add {
                    bsscfgidx: 3,
                    name: "wlan3".to_string(),
                    p2pdev: false
                },
                HostCall::Remove(3),
            ]
        );
        assert!(!harness.host.has_interface(3));
    }

    #[test]
    fn should_leave_deletion_to_armed_waiter() {
        let harness = Harness::new();
        harness.host.arm_delete_waiter(3);

        harness.feed(&[
            packets::interface(IfAction::Add, 3, "wlan3"),
            packets::interface(IfAction::Del, 3, "wlan3"),
        ]);

        let harness = harness.finish();
        assert!(!harness.host.calls().contains(&HostCall::Remove(3)));
        assert!(harness.host.has_interface(3));
    }

    #[test]
    fn should_notify_interface_listener_without_net_attach() {
        let harness = Harness::new();
        let log = DeliveryLog::default();
        harness.engine.register(EventCode::IF, log.handler()).unwrap();

        harness.feed(&[
            packets::interface(IfAction::Add, 2, "wlan2"),
            packets::interface(IfAction::Change, 2, "wlan2"),
        ]);

        let harness = harness.finish();
        assert_eq!(
            harness.host.calls(),
            vec![
                HostCall::Add {
                    bsscfgidx: 2,
                    name: "wlan2".to_string(),
                    p2pdev: false
                },
                HostCall::ProtoAdd(2),
                HostCall::ProtoReset(2),
            ]
        );
        let names: Vec<String> = log.deliveries().into_iter().map(|d| d.ifname).collect();
        assert_eq!(names, vec!["wlan2", "wlan2"]);
    }

    #[test]
    fn should_suppress_placeholder_unless_peer_device() {
        let harness = Harness::new();
        let placeholder = IfEvent::new()
            .with_ifidx(1)
            .with_bsscfgidx(1)
            .with_action(IfAction::Add)
            .with_flags(IF_FLAG_NOIF)
            .with_role(IF_ROLE_STA);

        harness.feed(&[packets::interface_with(placeholder, "p2p-dev-wlan0")]);

        let harness = harness.finish();
        assert!(harness.host.calls().is_empty());
        assert_eq!(harness.engine.stats().suppressed_interface_events, 1);
    }

    #[test]
    fn should_create_peer_device_without_protocol_attach() {
        let harness = Harness::new();
        let peer = IfEvent::new()
            .with_ifidx(1)
            .with_bsscfgidx(1)
            .with_action(IfAction::Add)
            .with_flags(IF_FLAG_NOIF)
            .with_role(IF_ROLE_P2P_CLIENT);

        harness.feed(&[packets::interface_with(peer, "p2p-dev-wlan0")]);

        let harness = harness.finish();
        assert_eq!(
            harness.host.calls(),
            vec![
                HostCall::Add {
                    bsscfgidx: 1,
                    name: "p2p-dev-wlan0".to_string(),
                    p2pdev: true
                },
                HostCall::NetAttach(1),
            ]
        );
    }

    #[test]
    fn should_accept_station_placeholder_while_peer_setup_ongoing() {
        let harness = Harness::new();
        harness.engine.set_peer_setup_ongoing(true);
        let placeholder = IfEvent::new()
            .with_ifidx(1)
            .with_bsscfgidx(1)
            .with_action(IfAction::Add)
            .with_flags(IF_FLAG_NOIF)
            .with_role(IF_ROLE_STA);

        harness.feed(&[packets::interface_with(placeholder, "p2p-dev-wlan0")]);

        let harness = harness.finish();
        assert!(harness.host.has_interface(1));
    }

    #[test]
    fn should_reject_interface_index_at_limit() {
        let harness = Harness::new();
        let out_of_range = IfEvent::new()
            .with_ifidx(16)
            .with_bsscfgidx(1)
            .with_action(IfAction::Add);

        harness.feed(&[packets::interface_with(out_of_range, "wlan16")]);

        let harness = harness.finish();
        assert!(harness.host.calls().is_empty());
        assert_eq!(harness.engine.stats().dropped.get("invalid_interface"), Some(&1));
    }
}

mod shutdown {
    use super::*;

    #[test]
    fn should_process_every_queued_event_before_detach_returns() {
        let harness = Harness::new();
        let log = DeliveryLog::default();
        harness.engine.register(EventCode::LINK, log.handler()).unwrap();
        let batch: Vec<Vec<u8>> = (0..200)
            .map(|status| packets::event_with_status(EventCode::LINK, status))
            .collect();

        harness.feed(&batch);
        let harness = harness.finish();

        assert_eq!(log.deliveries().len(), 200);
        assert_eq!(harness.engine.queue_len(), 0);
        assert!(!harness.engine.is_running());
    }

    #[test]
    fn should_continue_after_unhandled_event() {
        let harness = Harness::new();
        let log = DeliveryLog::default();
        harness.engine.register(EventCode::LINK, log.handler()).unwrap();
        harness.engine.register(EventCode::ROAM, log.handler()).unwrap();
        harness.feed(&[packets::event_with_status(EventCode::ROAM, 1)]);
        harness.engine.unregister(EventCode::ROAM);

        harness.feed(&[packets::event_with_status(EventCode::LINK, 2)]);

        harness.finish();
        assert!(log.statuses().contains(&2));
    }
}
