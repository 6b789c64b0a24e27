use streamview::charts::{create_chart, registered_kinds, BarChart, Chart, ChartConfig, Heatmap, ScatterPlot};
use streamview::core::{Category, Color, DrawCommand, DrawSurface, RecordingSurface, Sample};

fn ramp(count: usize) -> Vec<Sample> {
    (0..count)
        .map(|i| Sample::new(i as i64 * 1_000, 50.0 + (i % 10) as f64, Category::from_index(i)))
        .collect()
}

fn render(chart: &mut dyn Chart, samples: &[Sample]) -> RecordingSurface {
    let mut surface = RecordingSurface::new(800.0, 400.0);
    chart.prepare(samples);
    let canvas = surface.bounds();
    surface.clear(canvas, Color::WHITE);
    chart.draw(&mut surface);
    surface
}

#[test]
fn test_all_kinds_registered() {
    assert_eq!(registered_kinds(), vec!["bar", "heatmap", "line", "scatter"]);
    for kind in registered_kinds() {
        let chart = create_chart(&ChartConfig::of_kind(kind)).unwrap();
        assert_eq!(chart.kind(), kind);
    }
}

#[test]
fn test_unknown_kind_is_rejected() {
    let err = create_chart(&ChartConfig::of_kind("pie")).err().unwrap();
    assert!(err.to_string().contains("Unknown chart kind: pie"));
}

#[test]
fn test_line_chart_draws_one_path_with_axes() {
    let mut chart = create_chart(&ChartConfig::of_kind("line")).unwrap();
    let surface = render(chart.as_mut(), &ramp(50));

    assert_eq!(chart.element_count(), 50);
    let paths = surface.count(|c| matches!(c, DrawCommand::StrokePath { .. }));
    assert_eq!(paths, 3, "two axis lines and the data path");
    let labels = surface.count(|c| matches!(c, DrawCommand::Text { .. }));
    assert_eq!(labels, 4);
}

#[test]
fn test_bar_chart_buckets_by_period() {
    let config = ChartConfig {
        aggregation_period_ms: 10_000,
        ..ChartConfig::of_kind("bar")
    };
    let mut chart = BarChart::new(&config);
    let surface = render(&mut chart, &ramp(35));

    assert_eq!(chart.buckets().len(), 4);
    assert_eq!(chart.buckets()[3].count, 5);
    assert_eq!(surface.count(|c| matches!(c, DrawCommand::FillRect { .. })), 4);

    let plot = config.viewport().plot_width();
    for rect in chart.bar_rects() {
        assert!(rect.width >= 5.0);
        assert!(rect.x >= config.padding && rect.x + rect.width <= config.padding + plot);
        assert!(rect.y + rect.height <= config.height - config.padding + 1e-9);
    }
}

#[test]
fn test_scatter_respects_point_budget() {
    let config = ChartConfig {
        max_points: 100,
        ..ChartConfig::of_kind("scatter")
    };
    let mut chart = ScatterPlot::new(&config);
    let surface = render(&mut chart, &ramp(1_050));

    assert_eq!(chart.source_len(), 1_050);
    assert!(chart.element_count() <= 100);
    let circles = surface.count(|c| matches!(c, DrawCommand::FillCircle { .. }));
    assert_eq!(circles, chart.element_count());
}

#[test]
fn test_empty_snapshot_draws_no_data() {
    for kind in ["bar", "scatter", "heatmap"] {
        let mut chart = create_chart(&ChartConfig::of_kind(kind)).unwrap();
        let surface = render(chart.as_mut(), &[]);
        assert_eq!(chart.element_count(), 0, "{}", kind);
        assert_eq!(surface.commands().len(), 1, "{} should leave only the clear", kind);
    }
}

#[test]
fn test_heatmap_grid_matches_canvas() {
    let config = ChartConfig {
        width: 100.0,
        height: 50.0,
        ..ChartConfig::of_kind("heatmap")
    };
    let mut chart = Heatmap::new(&config);
    chart.prepare(&ramp(200));

    assert_eq!(chart.grid().cols, 10);
    assert_eq!(chart.grid().rows, 5);
    assert_eq!(chart.grid().total(), 200);
    assert_eq!(chart.element_count(), 50);
}

#[test]
fn test_heatmap_color_ramp() {
    assert_eq!(Heatmap::cell_color(0, 10), Color::rgb(0, 0, 255));
    assert_eq!(Heatmap::cell_color(0, 0), Color::rgb(0, 0, 255));
    assert_eq!(Heatmap::cell_color(10, 10), Color::from_hsl(0.0, 100.0, 20.0));
}
