use std::f64::consts::PI;

/// Game tuning shared by server and clients. Distances are field units,
/// speeds are units per tick, durations are ticks.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub field_width: f64,
    pub field_height: f64,
    pub paddle_width: f64,
    pub paddle_height: f64,
    /// Gap between a side wall and its paddle
    pub paddle_offset: f64,
    /// Vertical margin the paddle may not enter
    pub paddle_padding: f64,
    pub paddle_speed: f64,
    pub ball_radius: f64,
    pub ball_speed: f64,
    pub fast_ball_multiplier: f64,
    pub fast_ball_duration: u32,
    pub power_up_radius: f64,
    pub power_up_spawn_min: u32,
    pub power_up_spawn_max: u32,
    /// Half-width of the spawn band around the center line
    pub power_up_spawn_band: f64,
    pub power_up_bob_amplitude: f64,
    /// Radians of bob phase per tick
    pub power_up_bob_step: f64,
    /// Half-angle of the launch cone around the horizontal axis (radians)
    pub launch_cone: f64,
    /// Steepest angle the ball may leave a paddle at (radians)
    pub max_bounce_angle: f64,
    /// Largest extra angle a moving paddle can add (radians)
    pub paddle_deflection: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field_width: 800.0,
            field_height: 600.0,
            paddle_width: 20.0,
            paddle_height: 175.0,
            paddle_offset: 20.0,
            paddle_padding: 10.0,
            paddle_speed: 20.0,
            ball_radius: 10.0,
            ball_speed: 6.0,
            fast_ball_multiplier: 2.0,
            fast_ball_duration: 180, // 3s at 60 Hz
            power_up_radius: 15.0,
            power_up_spawn_min: 60,
            power_up_spawn_max: 420,
            power_up_spawn_band: 50.0,
            power_up_bob_amplitude: 10.0,
            power_up_bob_step: 0.1,
            launch_cone: PI / 4.0,
            max_bounce_angle: PI / 3.0,
            paddle_deflection: PI / 6.0,
        }
    }
}

impl GameConfig {
    pub fn center(&self) -> crate::vec2::Vec2 {
        crate::vec2::Vec2::new(self.field_width / 2.0, self.field_height / 2.0)
    }

    /// Lowest and highest y the top edge of a paddle may take.
    pub fn paddle_y_bounds(&self) -> (f64, f64) {
        (
            self.paddle_padding,
            self.field_height - self.paddle_height - self.paddle_padding,
        )
    }

    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("paddle_speed", self.paddle_speed),
            ("ball_radius", self.ball_radius),
            ("ball_speed", self.ball_speed),
            ("fast_ball_multiplier", self.fast_ball_multiplier),
            ("power_up_radius", self.power_up_radius),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{} must be finite and > 0", name));
            }
        }
        if self.paddle_padding < 0.0 || self.paddle_offset < 0.0 {
            return Err("paddle_padding and paddle_offset must be >= 0".to_string());
        }
        let (min_y, max_y) = self.paddle_y_bounds();
        if min_y > max_y {
            return Err("paddle does not fit between the paddings".to_string());
        }
        if 2.0 * (self.paddle_offset + self.paddle_width) >= self.field_width {
            return Err("paddles overlap horizontally".to_string());
        }
        if 2.0 * self.ball_radius >= self.field_height {
            return Err("ball_radius too large for field".to_string());
        }
        if self.fast_ball_duration == 0 {
            return Err("fast_ball_duration must be > 0".to_string());
        }
        if self.power_up_spawn_min == 0 || self.power_up_spawn_max < self.power_up_spawn_min {
            return Err("power-up spawn range must satisfy 0 < min <= max".to_string());
        }
        if self.power_up_spawn_band < 0.0 || 2.0 * self.power_up_radius >= self.field_height {
            return Err("power-up spawn area does not fit the field".to_string());
        }
        if !(0.0..PI / 2.0).contains(&self.launch_cone)
            || !(0.0..PI / 2.0).contains(&self.max_bounce_angle)
        {
            return Err("launch_cone and max_bounce_angle must be in [0, PI/2)".to_string());
        }
        if self.paddle_deflection < 0.0 || !self.paddle_deflection.is_finite() {
            return Err("paddle_deflection must be finite and >= 0".to_string());
        }
        Ok(())
    }
}
