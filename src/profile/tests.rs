use super::*;
use approx::{assert_abs_diff_eq, assert_relative_eq};

/// A dry high site in the tropics.
fn high_site() -> BasicParameters {
    BasicParameters::new(
        Length::new(5000.0, "m"),
        Pressure::new(550.0, "mb"),
        Temperature::new(270.0, "K"),
        -5.6,
        Humidity::new(20.0, "%"),
        Length::new(2.0, "km"),
        AtmosphereType::Tropical,
    )
}

fn sea_level(atm_type: AtmosphereType) -> BasicParameters {
    BasicParameters::new(
        Length::new(0.0, "m"),
        Pressure::new(1013.0, "mb"),
        Temperature::new(288.0, "K"),
        -6.5,
        Humidity::new(50.0, "%"),
        Length::new(2.0, "km"),
        atm_type,
    )
}

fn assert_consistent_lengths(profile: &AtmProfile) {
    let n = profile.num_layers();
    assert_eq!(profile.thickness_profile().len(), n);
    assert_eq!(profile.temperature_profile().len(), n);
    assert_eq!(profile.pressure_profile().len(), n);
    assert_eq!(profile.water_vapor_profile().len(), n);
    assert_eq!(profile.o3_profile().len(), n);
    assert_eq!(profile.co_profile().len(), n);
    assert_eq!(profile.n2o_profile().len(), n);
}

#[test]
fn high_site_profile() {
    let profile = AtmProfile::new(high_site());

    assert_eq!(profile.num_layers(), 20);
    assert_eq!(profile.tropopause_layer(), 10);
    assert_relative_eq!(profile.tropopause_altitude().get("m"), 9864.66, max_relative = 1e-5);
    assert_relative_eq!(profile.tropopause_temperature().get("K"), 242.758, max_relative = 1e-5);
    assert!(profile.has_new_basic_parameters());
    assert_consistent_lengths(&profile);

    assert_relative_eq!(profile.layer_thickness(0).unwrap().get("m"), 146.076, max_relative = 1e-5);
    assert_relative_eq!(profile.layer_temperature(0).unwrap().get("K"), 269.591, max_relative = 1e-5);
    assert_relative_eq!(profile.layer_pressure(0).unwrap().get("mb"), 544.977, max_relative = 1e-5);
    assert_relative_eq!(
        profile.layer_water_vapor_mass_density(0).unwrap().get("kgm**-3"),
        7.61795e-4,
        max_relative = 1e-5
    );
    assert_relative_eq!(profile.layer_o3(0).unwrap().get("m**-3"), 5.62868e17, max_relative = 1e-5);
    assert_relative_eq!(profile.layer_co(0).unwrap().get("m**-3"), 1.93850e18, max_relative = 1e-5);
    assert_relative_eq!(profile.layer_n2o(0).unwrap().get("m**-3"), 4.76149e18, max_relative = 1e-5);

    assert_relative_eq!(profile.ground_wh2o().get("mm"), 1.570874, max_relative = 1e-5);
}

#[test]
fn end_to_end_scenario() {
    let profile = AtmProfile::new(high_site());

    assert!(profile.num_layers() > 0);
    let tropo_km = profile.tropopause_altitude().get("km");
    assert!(tropo_km > 5.0 && tropo_km < 48.0, "tropopause at {tropo_km} km");
    assert!(profile.layer_pressure(0).unwrap().get("mb") < 550.0);
    assert!(profile.layer_temperature(0).unwrap().get("K") < 270.0);
}

#[test]
fn pressure_decreases_through_the_troposphere() {
    for atm in AtmosphereType::ALL {
        let profile = AtmProfile::new(sea_level(atm));
        let p = profile.pressure_profile();
        assert!(
            p.windows(2).all(|w| w[1].value() < w[0].value()),
            "pressure not decreasing for {atm}"
        );
        assert_consistent_lengths(&profile);
    }
}

#[test]
fn sea_level_layer_counts() {
    let expected = [(24, 15), (24, 15), (26, 14), (26, 14), (26, 14)];
    for (atm, (layers, tropo)) in AtmosphereType::ALL.into_iter().zip(expected) {
        let profile = AtmProfile::new(sea_level(atm));
        assert_eq!(profile.num_layers(), layers, "{atm}");
        assert_eq!(profile.tropopause_layer(), tropo, "{atm}");
    }
    let profile = AtmProfile::new(sea_level(AtmosphereType::MidlatSummer));
    assert_relative_eq!(profile.tropopause_altitude().get("m"), 9540.666, max_relative = 1e-5);
}

#[test]
fn thicknesses_sum_to_the_column() {
    let params = high_site();
    let profile = AtmProfile::new(params);
    let total: f64 = profile.thickness_profile().iter().map(|t| t.get("km")).sum();
    // stops within one layer of the top
    assert!(total + params.altitude().get("km") <= params.top_atm_profile().get("km"));
    assert!(total > 30.0);
}

#[test]
fn update_is_idempotent() {
    let params = high_site();
    let mut profile = AtmProfile::new(params);
    profile.acknowledge_basic_parameters();
    let before = profile.clone();

    let changed = profile.update_atm_profile(
        params.altitude(),
        params.ground_pressure(),
        params.ground_temperature(),
        params.tropo_lapse_rate(),
        params.relative_humidity(),
        params.wv_scale_height(),
    );
    assert!(!changed);
    assert!(!profile.has_new_basic_parameters());
    assert_eq!(profile.pressure_profile(), before.pressure_profile());
    assert_eq!(profile.temperature_profile(), before.temperature_profile());
    assert_eq!(profile.num_layers(), before.num_layers());
}

#[test]
fn update_rebuilds_on_change() {
    let params = high_site();
    let mut profile = AtmProfile::new(params);
    profile.acknowledge_basic_parameters();

    let changed = profile.set_basic_atmospheric_parameters(
        params.altitude(),
        params.ground_pressure(),
        Temperature::new(275.0, "K"),
        params.tropo_lapse_rate(),
        params.relative_humidity(),
        params.wv_scale_height(),
    );
    assert!(changed);
    assert!(profile.has_new_basic_parameters());
    assert_relative_eq!(
        profile.basic_parameters().unwrap().ground_temperature().get("K"),
        275.0
    );
    assert!(profile.layer_temperature(0).unwrap().get("K") > 274.0);
    assert_consistent_lengths(&profile);

    // a repeat of the same values is a no-op
    let again = profile.update_atm_profile(
        params.altitude(),
        params.ground_pressure(),
        Temperature::new(275.0, "K"),
        params.tropo_lapse_rate(),
        params.relative_humidity(),
        params.wv_scale_height(),
    );
    assert!(!again);
}

#[test]
fn unit_of_input_does_not_matter() {
    let a = AtmProfile::new(high_site());
    let b = AtmProfile::new(BasicParameters::new(
        Length::new(5.0, "km"),
        Pressure::new(550.0, "hPa"),
        Temperature::new(270.0 - 273.15, "C"),
        -5.6,
        Humidity::new(20.0, "%"),
        Length::new(2000.0, "m"),
        AtmosphereType::Tropical,
    ));
    assert_eq!(a.num_layers(), b.num_layers());
    for (x, y) in a.pressure_profile().iter().zip(b.pressure_profile()) {
        assert_relative_eq!(x.value(), y.value(), max_relative = 1e-9);
    }
}

#[test]
fn out_of_range_layers() {
    let mut profile = AtmProfile::new(high_site());
    let n = profile.num_layers();

    assert!(profile.layer_thickness(n).is_none());
    assert!(profile.layer_pressure(n + 10).is_none());
    assert!(profile.layer_water_vapor_number_density(n).is_none());
    assert_eq!(
        crate::units::or_sentinel(profile.layer_temperature(n)).get("K"),
        crate::units::SENTINEL
    );
    assert_eq!(
        crate::units::or_sentinel(profile.layer_o3(n)).get("m**-3"),
        crate::units::SENTINEL
    );

    let err = profile.set_layer_pressure(n, Pressure::new(1.0, "mb"));
    assert_eq!(err, Err(AtmError::LayerOutOfRange { index: n, num_layers: n }));
    assert_consistent_lengths(&profile);
}

#[test]
fn setters_touch_one_layer() {
    let mut profile = AtmProfile::new(high_site());
    let before = profile.clone();

    profile.set_layer_temperature(3, Temperature::new(0.0, "C")).unwrap();
    profile.set_layer_co(3, NumberDensity::new(1.0, "cm**-3")).unwrap();

    assert_relative_eq!(profile.layer_temperature(3).unwrap().get("K"), 273.15);
    assert_relative_eq!(profile.layer_co(3).unwrap().get("m**-3"), 1.0e6);
    assert_eq!(profile.layer_temperature(2), before.layer_temperature(2));
    assert_eq!(profile.layer_temperature(4), before.layer_temperature(4));
    assert_eq!(profile.pressure_profile(), before.pressure_profile());
}

#[test]
fn water_vapor_number_density() {
    let mut profile = AtmProfile::new(high_site());
    let mass = profile.layer_water_vapor_mass_density(0).unwrap().get("kgm**-3");
    let number = profile.layer_water_vapor_number_density(0).unwrap().get("m**-3");
    assert_relative_eq!(number, mass * 6.023e23 * 1000.0 / 18.0, max_relative = 1e-12);

    profile
        .set_layer_water_vapor_number_density(1, NumberDensity::new(6.023e23, "m**-3"))
        .unwrap();
    assert_relative_eq!(
        profile.layer_water_vapor_mass_density(1).unwrap().get("gm**-3"),
        18.0,
        max_relative = 1e-12
    );
}

#[test]
fn corrected_co_indexing_only_changes_co() {
    let options = ProfileOptions {
        co_indexing: CoTableIndexing::Corrected,
        ..ProfileOptions::default()
    };
    let legacy = AtmProfile::new(high_site());
    let corrected = AtmProfile::with_options(high_site(), options);

    assert_eq!(legacy.num_layers(), corrected.num_layers());
    assert_eq!(legacy.o3_profile(), corrected.o3_profile());
    assert_eq!(legacy.n2o_profile(), corrected.n2o_profile());
    assert_eq!(legacy.pressure_profile(), corrected.pressure_profile());
    assert_ne!(legacy.co_profile(), corrected.co_profile());
}

fn layer_input(n: usize) -> LayerProfile {
    LayerProfile::new(
        vec![Length::new(500.0, "m"); n],
        (0..n).map(|i| Pressure::new(900.0 - 50.0 * i as f64, "mb")).collect(),
        vec![Temperature::new(280.0, "K"); n],
        WaterVaporProfile::Mass(vec![MassDensity::new(4.0, "gm**-3"); n]),
    )
}

#[test]
fn user_supplied_layers() {
    let profile = AtmProfile::from_layers(layer_input(4));

    assert_eq!(profile.num_layers(), 4);
    assert!(profile.basic_parameters().is_none());
    assert!(profile.has_new_basic_parameters());
    assert_consistent_lengths(&profile);
    assert_eq!(profile.layer_o3(2).unwrap().value(), 0.0);
    assert_relative_eq!(profile.layer_pressure(3).unwrap().get("mb"), 750.0);
    // 4 layers of 500 m at 4 g/m³ is 8 mm
    assert_abs_diff_eq!(profile.ground_wh2o().get("mm"), 8.0, epsilon = 1e-9);
}

#[test]
fn user_supplied_number_densities_and_gases() {
    let n = 3;
    let mut input = layer_input(n);
    input.water_vapor = WaterVaporProfile::Number(vec![NumberDensity::new(6.023e23, "m**-3"); n]);
    let input = input
        .with_o3(vec![NumberDensity::new(1.0e18, "m**-3"); n])
        .with_co_n2o(
            vec![NumberDensity::new(2.0e18, "m**-3"); n],
            vec![NumberDensity::new(3.0, "cm**-3"); n],
        );

    let profile = AtmProfile::try_from_layers(input).unwrap();
    assert_relative_eq!(
        profile.layer_water_vapor_mass_density(2).unwrap().get("kgm**-3"),
        0.018,
        max_relative = 1e-12
    );
    assert_relative_eq!(profile.layer_o3(0).unwrap().value(), 1.0e18);
    assert_relative_eq!(profile.layer_co(1).unwrap().value(), 2.0e18);
    assert_relative_eq!(profile.layer_n2o(2).unwrap().value(), 3.0e6);
}

#[test]
fn mismatched_layers() {
    let mut input = layer_input(4);
    input.temperature.pop();

    let legacy = AtmProfile::from_layers(input.clone());
    assert_eq!(legacy.num_layers(), 0);
    assert_consistent_lengths(&legacy);
    assert!(legacy.layer_temperature(0).is_none());

    assert_eq!(AtmProfile::try_from_layers(input).unwrap_err(), AtmError::InconsistentInputs);

    let short_gas = layer_input(4).with_o3(vec![NumberDensity::default(); 3]);
    assert!(AtmProfile::try_from_layers(short_gas).is_err());
}

#[test]
fn update_on_user_layers_is_ignored() {
    let mut profile = AtmProfile::from_layers(layer_input(2));
    let params = high_site();
    let changed = profile.update_atm_profile(
        params.altitude(),
        params.ground_pressure(),
        params.ground_temperature(),
        params.tropo_lapse_rate(),
        params.relative_humidity(),
        params.wv_scale_height(),
    );
    assert!(!changed);
    assert_eq!(profile.num_layers(), 2);
}

#[test]
fn zeroed_profile() {
    let profile = AtmProfile::with_layers(5);
    assert_eq!(profile.num_layers(), 5);
    assert_consistent_lengths(&profile);
    assert!(profile.thickness_profile().iter().all(|t| t.value() == 0.0));
    assert_eq!(profile.ground_wh2o().value(), 0.0);
}

#[test]
fn atmosphere_types() {
    assert_eq!(AtmosphereType::try_from(3u32), Ok(AtmosphereType::MidlatWinter));
    assert_eq!(AtmosphereType::try_from(0u32), Err(AtmError::UnknownAtmosphereType(0)));
    assert_eq!(AtmosphereType::try_from(6u32), Err(AtmError::UnknownAtmosphereType(6)));
    assert_eq!(AtmosphereType::SubarcticSummer.to_string(), "SUBARCTICSUMMER");
    assert_eq!(AtmosphereType::SubarcticWinter.pressure_limit(), 332.0);
    assert_eq!(pressure_limit_for_code(7), 250.0);
    assert_eq!(pressure_limit_for_code(2), 198.0);

    let names = list_atmosphere_types();
    assert_eq!(names.len(), 5);
    assert_eq!(names[0], "1 - TROPICAL");
    assert_eq!(names[4], "5 - SUBARCTICWINTER");
}

#[test]
fn default_stepping() {
    let params = high_site();
    assert_relative_eq!(params.pressure_step().get("mb"), 10.0);
    assert_relative_eq!(params.pressure_step_factor(), 1.2);
    assert_relative_eq!(params.top_atm_profile().get("km"), 48.0);

    let finer = params.with_pressure_step(Pressure::new(5.0, "mb")).with_pressure_step_factor(1.1);
    let coarse = AtmProfile::new(params);
    let fine = AtmProfile::new(finer);
    assert!(fine.num_layers() > coarse.num_layers());
}
