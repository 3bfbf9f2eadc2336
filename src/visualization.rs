//! # Visualization
//!
//! $$
//! \{(\sigma_i, R_i, S_i)\}_{i} \mapsto \text{risk/return scatter coloured by } S
//! $$
//!
use std::fs;
use std::path::Path;

use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;
use plotly::common::ColorBar;
use plotly::common::ColorScale;
use plotly::common::ColorScalePalette;
use plotly::common::Marker;
use plotly::common::MarkerSymbol;
use plotly::common::Mode;
use plotly::common::Title;
use plotly::layout::Axis;

use crate::error::Result;
use crate::portfolio::BestPortfolio;
use crate::portfolio::BestPortfolios;
use crate::portfolio::SimulationResult;

fn highlight(best: &BestPortfolio<'_>, name: &str, color: &'static str) -> Box<Scatter<f64, f64>> {
  Scatter::new(vec![best.sample.volatility], vec![best.sample.expected_return])
    .mode(Mode::Markers)
    .name(name)
    .marker(
      Marker::new()
        .symbol(MarkerSymbol::Star)
        .size(16)
        .color(color),
    )
}

/// Scatter of every trial (risk on x, return on y, Sharpe as colour) with both
/// selections starred.
pub fn frontier_plot(result: &SimulationResult, best: &BestPortfolios<'_>) -> Plot {
  let cloud = Scatter::new(result.volatilities(), result.returns())
    .mode(Mode::Markers)
    .name("Simulated portfolios")
    .marker(
      Marker::new()
        .size(4)
        .color_array(result.sharpes())
        .color_scale(ColorScale::Palette(ColorScalePalette::YlGnBu))
        .show_scale(true)
        .color_bar(ColorBar::new().title(Title::from("Sharpe Ratio"))),
    );

  let mut plot = Plot::new();
  plot.add_trace(cloud);
  plot.add_trace(highlight(&best.max_sharpe, "Max Sharpe Ratio", "red"));
  plot.add_trace(highlight(&best.min_risk, "Min Risk", "green"));
  plot.set_layout(
    Layout::new()
      .title("Risk vs Return")
      .x_axis(Axis::new().title("Risk (standard deviation)"))
      .y_axis(Axis::new().title("Expected return")),
  );
  plot
}

/// Render [`frontier_plot`] to a standalone HTML file.
pub fn write_frontier_html(
  result: &SimulationResult,
  best: &BestPortfolios<'_>,
  path: impl AsRef<Path>,
) -> Result<()> {
  let path = path.as_ref();
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)?;
  }
  fs::write(path, frontier_plot(result, best).to_html())?;
  Ok(())
}
