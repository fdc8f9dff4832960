use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;

use ql::prelude::QlError;

const PLOT_SIZE: (u32, u32) = (800, 400);

/// Draws the total reward per episode as a line chart into a PNG file
pub fn plot_rewards(
    rewards: &[f32],
    path: &Path,
) -> Result<()> {
    if rewards.is_empty() {
        return Err(QlError::from("no rewards to plot"))?;
    }
    let (min, max) = rewards
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &r| (lo.min(r), hi.max(r)));
    // a flat line still needs a visible y-range
    let margin = ((max - min) * 0.05).max(1.0);

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Q-Learning Training Rewards", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0..rewards.len(), (min - margin)..(max + margin))?;

    chart
        .configure_mesh()
        .x_desc("Episode")
        .y_desc("Total Reward")
        .draw()?;

    chart.draw_series(LineSeries::new(
        rewards.iter().enumerate().map(|(episode, &reward)| (episode, reward)),
        &BLUE,
    ))?;

    root.present()?;
    log::info!("reward plot written to {}", path.display());
    Ok(())
}
