//! # Map Flows
//!
//! A UI widget drives one or more map widgets over the bus.
//!
//! ## Flows Tested
//!
//! 1. **Mirroring**: every map on the bus applies the same overlay commands
//! 2. **Visibility**: hiding an ancestor hides plotted layers on every map
//! 3. **Status**: a status request is answered by each map, addressed to the requester;
//!    feature value reports flow between status start and stop
//! 4. **Errors**: failed operations come back on `map.error` naming the requesting sender
//! 5. **Async dispatch**: the same flows through `InMemoryBus::run`

#[cfg(test)]
mod tests {
    use super::super::fixtures::{api, bus, collect, collect_errors, MapWidget};
    use cmw_01_channels::messages::{
        FeatureStatusReport, FeatureSublayer, StatusAbout, StatusFormat, StatusView,
    };
    use cmw_01_channels::Payload;
    use cmw_02_overlay_manager::UiRelay;
    use parking_lot::Mutex;
    use serde_json::json;
    use shared_types::FeatureFormat;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn own(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(o, f)| ((*o).to_string(), (*f).to_string()))
            .collect()
    }

    // =========================================================================
    // OVERLAY AND FEATURE COMMANDS
    // =========================================================================

    #[test]
    fn test_every_map_mirrors_ui_commands() {
        let bus = bus();
        let map_a = MapWidget::attach(&bus, "map-a");
        let map_b = MapWidget::attach(&bus, "map-b");
        let ui = UiRelay::new(api(&bus, "ui"));

        ui.send_overlay_create("roads", "Roads", None);
        ui.send_overlay_create("highways", "Highways", Some("roads"));
        ui.send_feature_plot_url("highways", "i95", "I-95", "kml", "http://fake.com/i95.kml", None, false);
        bus.dispatch_pending();

        let tree_a = map_a.adapter.manager().lock().overlay_tree();
        let tree_b = map_b.adapter.manager().lock().overlay_tree();
        assert_eq!(tree_a, tree_b);
        assert_eq!(tree_a.len(), 1);
        assert_eq!(tree_a[0].id, "roads");
        assert_eq!(tree_a[0].children[0].features[0].id, "i95");

        for map in [&map_a, &map_b] {
            assert_eq!(map.engine.visible(), own(&[("highways", "i95")]));
        }
    }

    #[test]
    fn test_ancestor_visibility_reaches_every_engine() {
        let bus = bus();
        let maps = [MapWidget::attach(&bus, "map-a"), MapWidget::attach(&bus, "map-b")];
        let ui = UiRelay::new(api(&bus, "ui"));

        ui.send_overlay_create("root", "Root", None);
        ui.send_overlay_create("leaf", "Leaf", Some("root"));
        ui.send_feature_plot_url("leaf", "a", "A", "kml", "http://fake.com/a", None, false);
        ui.send_feature_plot_url("root", "b", "B", "kml", "http://fake.com/b", None, false);
        ui.send_feature_hide("leaf", "a");
        ui.send_overlay_hide("root");
        bus.dispatch_pending();

        for map in &maps {
            assert!(map.engine.visible().is_empty());
            assert_eq!(map.engine.layer_count(), 2);
        }

        ui.send_overlay_show("root");
        bus.dispatch_pending();

        // "a" stays hidden on its own account.
        for map in &maps {
            assert_eq!(map.engine.visible(), own(&[("root", "b")]));
        }

        ui.send_overlay_remove("root");
        bus.dispatch_pending();
        for map in &maps {
            assert_eq!(map.engine.layer_count(), 0);
            assert!(map.adapter.manager().lock().overlays().is_empty());
        }
    }

    #[test]
    fn test_feature_moves_into_hidden_overlay() {
        let bus = bus();
        let map = MapWidget::attach(&bus, "map");
        let ui = UiRelay::new(api(&bus, "ui"));

        ui.send_overlay_create("draft", "Draft", None);
        ui.send_overlay_create("archive", "Archive", None);
        ui.send_overlay_hide("archive");
        ui.send_feature_plot_url("draft", "f", "F", "geojson", "http://fake.com/f", None, false);
        ui.send_feature_update("draft", "f", Some("Filed"), Some("archive"));
        bus.dispatch_pending();

        let manager = map.adapter.manager();
        let manager = manager.lock();
        assert!(manager.tree().feature("draft", "f").is_none());
        let moved = manager.tree().feature("archive", "f").unwrap();
        assert_eq!(moved.name, "Filed");
        assert!(moved.is_hidden);
        assert!(map.engine.visible().is_empty());
    }

    #[test]
    fn test_inline_plot_and_batch_messages() {
        let bus = bus();
        let map = MapWidget::attach(&bus, "map");
        let ui = api(&bus, "ui");

        ui.feature.plot.send_value(json!([
            {"overlayId": "o", "featureId": "p1", "format": "geojson",
             "feature": {"type": "Point", "coordinates": [1.0, 2.0]}},
            {"overlayId": "o", "featureId": "p2", "format": "geojson",
             "feature": {"type": "Point", "coordinates": [3.0, 4.0]}}
        ]));
        bus.dispatch_pending();

        assert_eq!(map.engine.visible(), own(&[("o", "p1"), ("o", "p2")]));
        assert_eq!(map.adapter.manager().lock().overlay("o").unwrap().name, "o");
    }

    #[test]
    fn test_tree_observer_sees_each_structural_change() {
        let bus = bus();
        let map = MapWidget::attach(&bus, "map");
        let ui = UiRelay::new(api(&bus, "ui"));

        let sizes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&sizes);
        map.adapter
            .manager()
            .lock()
            .bind_tree_change_handler(move |tree| {
                let overlays: usize = tree.iter().map(|node| node.count_overlays()).sum();
                let features: usize = tree.iter().map(|node| node.count_features()).sum();
                sink.lock().push((overlays, features));
            });

        ui.send_overlay_create("a", "A", None);
        ui.send_overlay_create("b", "B", Some("a"));
        ui.send_feature_plot_url("b", "f", "F", "kml", "http://fake.com", None, false);
        ui.send_overlay_hide("a");
        ui.send_feature_unplot("b", "f");
        bus.dispatch_pending();

        assert_eq!(*sizes.lock(), vec![(1, 0), (2, 0), (2, 1), (2, 0)]);
    }

    // =========================================================================
    // STATUS
    // =========================================================================

    #[test]
    fn test_status_request_answered_by_each_map() {
        let bus = bus();
        let _map_a = MapWidget::attach(&bus, "map-a");
        let _map_b = MapWidget::attach(&bus, "map-b");
        let ui = api(&bus, "ui");
        let views = collect::<StatusView>(&ui.status.view);
        let abouts = collect::<StatusAbout>(&ui.status.about);
        let formats = collect::<StatusFormat>(&ui.status.format);

        ui.status.request.send_value(json!({"types": ["view", "format"]}));
        bus.dispatch_pending();

        let views = views.lock();
        let mut responders: Vec<&str> = views.iter().map(|(sender, _)| sender.as_str()).collect();
        responders.sort_unstable();
        assert_eq!(responders, vec!["map-a", "map-b"]);
        assert!(views
            .iter()
            .all(|(_, view)| view.requester.as_deref() == Some("ui")));
        assert!(abouts.lock().is_empty());
        assert_eq!(
            formats.lock()[0].1.formats,
            vec![FeatureFormat::Kml, FeatureFormat::GeoJson]
        );
    }

    #[test]
    fn test_feature_status_reports_between_start_and_stop() {
        let bus = bus();
        let map_a = MapWidget::attach(&bus, "map-a");
        let map_b = MapWidget::attach(&bus, "map-b");
        let ui = api(&bus, "ui");
        let relay = UiRelay::new(ui.clone());
        let sublayers = collect::<FeatureSublayer>(&ui.feature.status_sublayers);
        let reports = collect::<FeatureStatusReport>(&ui.feature.status_report);

        relay.send_overlay_create("air", "Air Traffic", None);
        relay.send_feature_plot_url("air", "n123", "N123", "kml", "http://fake.com/n123.kml", None, false);
        ui.feature.status_request.send_default();
        bus.dispatch_pending();

        {
            let sublayers = sublayers.lock();
            assert_eq!(sublayers.len(), 2);
            for (_, sublayer) in sublayers.iter() {
                assert_eq!(sublayer.overlay_name, "Air Traffic");
                assert_eq!(sublayer.feature_name, "N123");
                assert_eq!(sublayer.sublayer_id, "altitude");
            }
        }

        let handle_a = map_a.adapter.manager().lock().tree().feature("air", "n123").unwrap().handle;
        let handle_b = map_b.adapter.manager().lock().tree().feature("air", "n123").unwrap().handle;

        relay.send_feature_status_start("air", "n123", Some("altitude"));
        bus.dispatch_pending();
        map_a.adapter.on_feature_value_changed(handle_a, "altitude", json!(10_500));
        bus.dispatch_pending();

        relay.send_feature_status_stop("air", "n123", Some("altitude"));
        bus.dispatch_pending();
        map_b.adapter.on_feature_value_changed(handle_b, "altitude", json!(11_000));
        bus.dispatch_pending();

        let reports = reports.lock();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, "map-a");
        assert_eq!(reports[0].1.feature_id, "n123");
        assert_eq!(reports[0].1.feature_value, json!(10_500));
    }

    #[test]
    fn test_invalid_status_request_is_rejected_before_maps() {
        let bus = bus();
        let _map = MapWidget::attach(&bus, "map");
        let ui = api(&bus, "ui");
        let views = collect::<StatusView>(&ui.status.view);
        let errors = collect_errors(&ui);

        ui.status.request.send_value(json!({"types": ["view", "weather"]}));
        bus.dispatch_pending();

        // The sender's own channel rejects it; nothing is published.
        assert!(views.lock().is_empty());
        assert_eq!(errors.lock().len(), 1);
        assert_eq!(errors.lock()[0].0, "ui");
        assert_eq!(bus.subscriber_count("map.status.request"), 1);
    }

    // =========================================================================
    // ERRORS
    // =========================================================================

    #[test]
    fn test_errors_name_requesting_sender() {
        let bus = bus();
        let _map_a = MapWidget::attach(&bus, "map-a");
        let _map_b = MapWidget::attach(&bus, "map-b");
        let ui = api(&bus, "ui");
        let errors = collect_errors(&ui);

        UiRelay::new(ui.clone()).send_feature_plot_url("o", "f", "F", "wms", "http://fake.com", None, false);
        bus.dispatch_pending();

        let errors = errors.lock();
        assert_eq!(errors.len(), 2);
        for (publisher, error) in errors.iter() {
            assert!(publisher.starts_with("map-"));
            assert_eq!(error.sender, "ui");
            assert_eq!(error.error_type, "map.feature.plot.url");
            assert_eq!(error.msg, "Unsupported format 'wms'");
            assert_eq!(error.error["type"], "unsupported_format");
        }
    }

    #[test]
    fn test_unbound_map_ignores_traffic() {
        let bus = bus();
        let map = MapWidget::attach(&bus, "map");
        let ui = UiRelay::new(api(&bus, "ui"));

        map.adapter.unbind();
        ui.send_overlay_create("o", "O", None);
        bus.dispatch_pending();

        assert!(map.adapter.manager().lock().overlays().is_empty());
    }

    // =========================================================================
    // ASYNC DISPATCH
    // =========================================================================

    #[tokio::test]
    async fn test_run_loop_drains_queue_on_shutdown() {
        let bus = bus();
        let map = MapWidget::attach(&bus, "map");
        let ui = UiRelay::new(api(&bus, "ui"));
        let dispatcher = tokio::spawn(Arc::clone(&bus).run());

        ui.send_overlay_create("o", "O", None);
        ui.send_feature_plot_url("o", "f", "F", "kml", "http://fake.com", None, false);
        bus.shutdown();

        timeout(Duration::from_secs(5), dispatcher)
            .await
            .expect("dispatcher finished")
            .expect("dispatcher did not panic");

        assert_eq!(map.engine.visible(), own(&[("o", "f")]));
        assert_eq!(bus.events_published(), bus.events_delivered());
    }

    #[tokio::test]
    async fn test_run_loop_answers_status_request() {
        let bus = bus();
        let _map = MapWidget::attach(&bus, "map");
        let ui = api(&bus, "ui");
        let (tx, mut rx) = mpsc::unbounded_channel();
        ui.status.about.add_typed_handler(move |sender, payload: Payload<StatusAbout>| {
            for about in payload.into_vec() {
                let _ = tx.send((sender.to_string(), about));
            }
        });
        let dispatcher = tokio::spawn(Arc::clone(&bus).run());

        ui.status.request.send_value(json!({"types": ["about"]}));

        let (sender, about) = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("about response arrived")
            .expect("channel open");
        assert_eq!(sender, "map");
        assert_eq!(about.widget_name, "Common Map Widget");

        bus.shutdown();
        dispatcher.await.expect("dispatcher did not panic");
    }
}
