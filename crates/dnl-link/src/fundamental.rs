//! Triangular fundamental diagram.
//!
//! ```text
//!  q (veh/h)
//!  C ┤      /\
//!    │  v_f/  \ -w
//!    │    /    \
//!    └───┴──────┴── k (veh/km)
//!        k_c    k_j
//! ```
//!
//! Four parameters describe the triangle: capacity `C`, free-flow speed
//! `v_f`, backward wave speed `w` and jam density `k_j`.  Any three fix the
//! fourth through `C = v_f·k_c = w·(k_j − k_c)`.

use crate::{LinkError, LinkResult};

/// Static parameters of one link.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FundamentalDiagram {
    /// Link length in km.
    pub length:      f64,
    /// Capacity in veh/h.
    pub capacity:    f64,
    /// Jam density in veh/km.
    pub jam_density: f64,
    /// Free-flow speed in km/h.
    pub free_speed:  f64,
    /// Backward (congestion) wave speed in km/h, positive.
    pub wave_speed:  f64,
}

fn positive(name: &'static str, value: f64) -> LinkResult<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(LinkError::InvalidParameter { name, value })
    }
}

impl FundamentalDiagram {
    /// Derive the wave speed from capacity, free-flow speed and jam density.
    pub fn triangular(length: f64, capacity: f64, free_speed: f64, jam_density: f64) -> LinkResult<Self> {
        let length      = positive("length", length)?;
        let capacity    = positive("capacity", capacity)?;
        let free_speed  = positive("free_speed", free_speed)?;
        let jam_density = positive("jam_density", jam_density)?;
        let critical = capacity / free_speed;
        if jam_density <= critical {
            return Err(LinkError::InfeasibleDiagram { jam_density, critical });
        }
        let wave_speed = capacity / (jam_density - critical);
        Ok(Self { length, capacity, jam_density, free_speed, wave_speed })
    }

    /// Derive the jam density from capacity and both wave speeds.
    pub fn with_wave_speed(length: f64, capacity: f64, free_speed: f64, wave_speed: f64) -> LinkResult<Self> {
        let length     = positive("length", length)?;
        let capacity   = positive("capacity", capacity)?;
        let free_speed = positive("free_speed", free_speed)?;
        let wave_speed = positive("wave_speed", wave_speed)?;
        let jam_density = capacity / free_speed + capacity / wave_speed;
        Ok(Self { length, capacity, jam_density, free_speed, wave_speed })
    }

    /// Zero-length virtual link.  `capacity` only weighs the connector in
    /// merge priorities; connectors never restrict flow.
    pub fn connector(capacity: f64) -> Self {
        Self {
            length:      0.0,
            capacity,
            jam_density: f64::INFINITY,
            free_speed:  f64::INFINITY,
            wave_speed:  f64::INFINITY,
        }
    }

    /// Density at capacity, veh/km.
    #[inline]
    pub fn critical_density(&self) -> f64 {
        self.capacity / self.free_speed
    }

    /// Free-flow travel time in hours.
    #[inline]
    pub fn free_flow_time(&self) -> f64 {
        self.length / self.free_speed
    }

    /// Time for a congestion wave to traverse the link, in hours.
    #[inline]
    pub fn backward_time(&self) -> f64 {
        self.length / self.wave_speed
    }

    /// Vehicles the link holds at jam density.
    #[inline]
    pub fn storage(&self) -> f64 {
        self.jam_density * self.length
    }
}
