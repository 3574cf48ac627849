//! # Channel Flows
//!
//! The channel layer between independent widgets, with no map involved.
//!
//! ## Flows Tested
//!
//! 1. **Defaults on both ends**: ids and names default from the sender
//! 2. **Foreign traffic**: malformed envelopes and bodies injected from outside
//! 3. **Identity**: anonymous widgets get prefixed, unique instance ids
//! 4. **Accounting**: per-widget metrics and handler removal

#[cfg(test)]
mod tests {
    use super::super::fixtures::{api, bus, collect, collect_errors};
    use cmw_01_channels::messages::{FeaturePlotUrl, OverlayCreate};
    use cmw_01_channels::{MapApi, Payload};
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use shared_bus::{BusConfig, InMemoryBus};
    use shared_types::{JsonCodec, WireBody};
    use std::sync::Arc;

    #[test]
    fn test_receiver_sees_sender_defaults() {
        let bus = bus();
        let sender = api(&bus, "track-widget");
        let receiver = api(&bus, "map");
        let plots = collect::<FeaturePlotUrl>(&receiver.feature.plot_url);

        sender
            .feature
            .plot_url
            .send_value(json!({"url": "http://fake.com/tracks.kml"}));
        bus.dispatch_pending();

        let plots = plots.lock();
        let (from, plot) = &plots[0];
        assert_eq!(from, "track-widget");
        assert_eq!(plot.overlay_id, "track-widget");
        assert_eq!(plot.feature_id, "track-widget");
        assert_eq!(plot.name, "track-widget");
        assert_eq!(plot.format, "kml");
        assert!(!plot.zoom);
    }

    #[test]
    fn test_untyped_listener_sees_wire_shape() {
        let bus = bus();
        let sender = api(&bus, "a");
        let receiver = api(&bus, "b");
        let shapes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&shapes);
        receiver.overlay.hide.add_handler(move |_, payload: Payload| {
            sink.lock().push(payload.len());
        });

        sender.overlay.hide.send_default();
        sender
            .overlay
            .hide
            .send_value(json!([{"overlayId": "x"}, {"overlayId": "y"}, {}]));
        bus.dispatch_pending();

        assert_eq!(*shapes.lock(), vec![1, 3]);
    }

    #[test]
    fn test_foreign_bad_envelope_reported_as_receiver() {
        let bus = bus();
        let receiver = api(&bus, "map");
        let creates = collect::<OverlayCreate>(&receiver.overlay.create);
        let errors = collect_errors(&receiver);

        bus.inject(
            "map.overlay.create",
            r#"{"name":"no id"}"#.to_string(),
            WireBody::Text(r#"{"overlayId":"o"}"#.to_string()),
        );
        bus.dispatch_pending();

        assert!(creates.lock().is_empty());
        let errors = errors.lock();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].1.sender, "map");
        assert_eq!(errors[0].1.error_type, "map.overlay.create");
        assert_eq!(errors[0].1.error, json!({"overlayId": "o"}));
    }

    #[test]
    fn test_foreign_structured_body_accepted() {
        let bus = bus();
        let receiver = api(&bus, "map");
        let creates = collect::<OverlayCreate>(&receiver.overlay.create);

        bus.inject(
            "map.overlay.create",
            r#"{"id":"remote","version":"1.1"}"#.to_string(),
            WireBody::Structured(json!({"name": "Remote"})),
        );
        bus.inject(
            "map.overlay.create",
            r#"{"id":"remote"}"#.to_string(),
            WireBody::Text("{not json".to_string()),
        );
        bus.dispatch_pending();

        let creates = creates.lock();
        assert_eq!(creates.len(), 1);
        assert_eq!(creates[0].0, "remote");
        assert_eq!(creates[0].1.overlay_id, "remote");
        assert_eq!(creates[0].1.name, "Remote");
    }

    #[test]
    fn test_error_reports_from_every_widget_reach_every_listener() {
        let bus = bus();
        let a = api(&bus, "a");
        let b = api(&bus, "b");
        let seen_by_a = collect_errors(&a);
        let seen_by_b = collect_errors(&b);

        a.error.send_error("a", "map.feature.plot", "layer failed", Value::Null);
        b.overlay.create.send_value(json!("not an object"));
        bus.dispatch_pending();

        for seen in [&seen_by_a, &seen_by_b] {
            let seen = seen.lock();
            let publishers: Vec<&str> = seen.iter().map(|(p, _)| p.as_str()).collect();
            assert_eq!(publishers, vec!["a", "b"]);
            assert_eq!(seen[1].1.error, json!("not an object"));
        }
    }

    #[test]
    fn test_anonymous_widgets_get_prefixed_ids() {
        let bus = InMemoryBus::with_config(
            Arc::new(JsonCodec),
            BusConfig {
                instance_prefix: "cmw".to_string(),
            },
        );
        let first = MapApi::new(Arc::new(bus.connect_anonymous()), Arc::new(JsonCodec));
        let second = MapApi::new(Arc::new(bus.connect_anonymous()), Arc::new(JsonCodec));

        assert!(first.instance_id().starts_with("cmw-"));
        assert_ne!(first.instance_id(), second.instance_id());

        let overlays = collect::<OverlayCreate>(&second.overlay.create);
        first.overlay.create.send_default();
        bus.dispatch_pending();
        assert_eq!(overlays.lock()[0].1.overlay_id, first.instance_id());
    }

    #[test]
    fn test_metrics_and_handler_removal() {
        let bus = bus();
        let a = api(&bus, "a");
        let b = api(&bus, "b");
        let _creates = collect::<OverlayCreate>(&b.overlay.create);

        a.overlay.create.send_default();
        a.overlay.create.send_value(json!([]));
        bus.inject(
            "map.overlay.create",
            r#"{"id":"x"}"#.to_string(),
            WireBody::Text("42".to_string()),
        );
        bus.dispatch_pending();

        let sent = a.metrics();
        assert_eq!(sent.sent, 2);
        assert_eq!(sent.send_rejected, 1);

        let received = b.metrics();
        assert_eq!(received.received, 2);
        assert_eq!(received.receive_rejected, 1);
        assert_eq!(received.listener_calls, 1);

        let _errors = collect_errors(&b);
        assert_eq!(bus.subscriber_count("map.error"), 1);
        b.remove_all_handlers();
        assert_eq!(bus.subscriber_count("map.overlay.create"), 0);
        assert_eq!(bus.subscriber_count("map.error"), 0);
    }
}
