// mr-core/src/units.rs

use uom::si::f64::{
    Angle as UomAngle, HeatCapacity as UomHeatCapacity, Power as UomPower,
    ThermodynamicTemperature as UomThermodynamicTemperature,
};

// Public canonical unit types (SI, f64)
pub type Angle = UomAngle;
pub type HeatCapacity = UomHeatCapacity;
pub type Power = UomPower;
pub type Temperature = UomThermodynamicTemperature;

#[inline]
pub fn deg(v: f64) -> Angle {
    use uom::si::angle::degree;
    Angle::new::<degree>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn mw(v: f64) -> Power {
    use uom::si::power::megawatt;
    Power::new::<megawatt>(v)
}

#[inline]
pub fn j_per_k(v: f64) -> HeatCapacity {
    use uom::si::heat_capacity::joule_per_kelvin;
    HeatCapacity::new::<joule_per_kelvin>(v)
}

/// Plain-`f64` views used inside the numerical kernels.
#[inline]
pub fn as_radians(a: Angle) -> f64 {
    use uom::si::angle::radian;
    a.get::<radian>()
}

#[inline]
pub fn as_kelvin(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    t.get::<kelvin>()
}

#[inline]
pub fn as_watts(p: Power) -> f64 {
    use uom::si::power::watt;
    p.get::<watt>()
}

#[inline]
pub fn as_j_per_k(c: HeatCapacity) -> f64 {
    use uom::si::heat_capacity::joule_per_kelvin;
    c.get::<joule_per_kelvin>()
}
