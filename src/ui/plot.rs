use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points};

use heart_dash::data::charts::ChartData;
use heart_dash::data::model::Disease;

use crate::color::ColorMap;
use crate::ui::labels;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Charts (central panel)
// ---------------------------------------------------------------------------

/// Render every chart for the current selection.
pub fn charts(ui: &mut Ui, charts: &ChartData, colors: &ColorMap<Disease>) {
    ui.columns(2, |cols| {
        cols[0].strong("Heart-disease cases");
        disease_split(&mut cols[0], charts, colors);
        cols[1].strong("Age distribution");
        age_histogram(&mut cols[1], charts, colors);
    });
    ui.add_space(8.0);

    ui.strong("Age vs cholesterol");
    age_vs_cholesterol(ui, charts, colors);
    ui.add_space(8.0);

    ui.strong("Max heart rate by disease status");
    heart_rate_boxes(ui, charts, colors);

    if let Some(months) = &charts.exams_per_month {
        ui.add_space(8.0);
        ui.strong("Exams per month");
        let points: PlotPoints = months
            .iter()
            .map(|m| [f64::from(m.year) + f64::from(m.month - 1) / 12.0, m.count as f64])
            .collect();
        Plot::new("exams_per_month")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Year")
            .y_axis_label("Exams")
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new(points).name("exams").width(1.5));
            });
    }
}

fn disease_split(ui: &mut Ui, charts: &ChartData, colors: &ColorMap<Disease>) {
    let total = charts.disease_split.total().max(1) as f64;
    Plot::new("disease_split")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .y_axis_label("% of records")
        .show(ui, |plot_ui| {
            for (i, disease) in Disease::ALL.into_iter().enumerate() {
                let share = 100.0 * charts.disease_split.get(disease) as f64 / total;
                let bar = Bar::new(i as f64, share).width(0.6);
                plot_ui.bar_chart(
                    BarChart::new(vec![bar])
                        .name(labels::disease(disease))
                        .color(colors.color_for(disease)),
                );
            }
        });
}

fn age_histogram(ui: &mut Ui, charts: &ChartData, colors: &ColorMap<Disease>) {
    let bars = |disease: Disease| -> Vec<Bar> {
        charts
            .age_histogram
            .iter()
            .map(|bin| {
                Bar::new((bin.start + bin.end) / 2.0, bin.counts.get(disease) as f64)
                    .width(bin.end - bin.start)
            })
            .collect()
    };
    let absent = BarChart::new(bars(Disease::Absent))
        .name(labels::disease(Disease::Absent))
        .color(colors.color_for(Disease::Absent));
    let present = BarChart::new(bars(Disease::Present))
        .name(labels::disease(Disease::Present))
        .color(colors.color_for(Disease::Present))
        .stack_on(&[&absent]);

    Plot::new("age_histogram")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .x_axis_label("Age")
        .y_axis_label("Records")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(absent);
            plot_ui.bar_chart(present);
        });
}

fn age_vs_cholesterol(ui: &mut Ui, charts: &ChartData, colors: &ColorMap<Disease>) {
    Plot::new("age_vs_cholesterol")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .x_axis_label("Age")
        .y_axis_label("Cholesterol (mg/dL)")
        .show(ui, |plot_ui| {
            for disease in Disease::ALL {
                let points: PlotPoints = charts
                    .age_vs_cholesterol
                    .iter()
                    .filter(|p| p.disease == disease)
                    .map(|p| [f64::from(p.age), p.chol])
                    .collect();
                plot_ui.points(
                    Points::new(points)
                        .name(labels::disease(disease))
                        .color(colors.color_for(disease))
                        .radius(3.0),
                );
            }
        });
}

fn heart_rate_boxes(ui: &mut Ui, charts: &ChartData, colors: &ColorMap<Disease>) {
    Plot::new("heart_rate_boxes")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .x_axis_label("Heart disease (0 = no, 1 = yes)")
        .y_axis_label("Max heart rate")
        .show(ui, |plot_ui| {
            for summary in &charts.heart_rate_by_disease {
                let x = f64::from(summary.disease.code());
                let color = colors.color_for(summary.disease);
                let spread = BoxSpread::new(
                    summary.lower_whisker,
                    summary.q1,
                    summary.median,
                    summary.q3,
                    summary.upper_whisker,
                );
                let elem = BoxElem::new(x, spread)
                    .box_width(0.5)
                    .whisker_width(0.3)
                    .fill(color.gamma_multiply(0.4))
                    .stroke(Stroke::new(1.5, color));
                plot_ui.box_plot(
                    BoxPlot::new(vec![elem])
                        .name(labels::disease(summary.disease))
                        .color(color),
                );

                if !summary.outliers.is_empty() {
                    let outliers: PlotPoints = summary.outliers.iter().map(|&y| [x, y]).collect();
                    plot_ui.points(Points::new(outliers).color(Color32::GRAY).radius(2.5));
                }
            }
        });
}
