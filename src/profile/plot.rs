use crate::profile::dataset::TemperatureProfile;
use crate::profile::error::DatasetError;
use plotlars::{LinePlot, Plot, Text};

/// Opens a line plot of temperature against pressure in the browser.
pub fn plot_profile(profile: &TemperatureProfile) -> Result<(), DatasetError> {
    let data = profile.to_frame()?;
    let title = format!(
        "Temperature profile at {} (requested {})",
        profile.grid_point, profile.requested
    );

    LinePlot::builder()
        .data(&data)
        .x("pressure")
        .y("temperature")
        .plot_title(Text::from(title.as_str()).size(18))
        .x_title("Pressure (hPa)")
        .y_title("Temperature (K)")
        .build()
        .plot();

    Ok(())
}
