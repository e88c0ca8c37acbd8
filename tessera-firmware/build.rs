//! Build script for tessera-firmware
//!
//! - Passes the esp-hal and defmt linker scripts
//! - Validates board.toml at compile time

use std::path::Path;

/// Highest GPIO number on the ESP32-S3
const MAX_GPIO: i64 = 48;

fn main() {
    setup_linker();
    validate_config();
}

/// Linker scripts provided by esp-hal and defmt
fn setup_linker() {
    println!("cargo:rustc-link-arg=-Tlinkall.x");
    if std::env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg=-Tdefmt.x");
    }
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate board.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a board.toml describing the panel, the      ║\n\
            ║  touch controller and the render settings. Please create one     ║\n\
            ║  in the tessera-firmware directory.                              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match std::fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in board.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    let mut errors = Vec::new();
    validate_panel(&config, &mut errors);
    validate_touch(&config, &mut errors);
    validate_render(&config, &mut errors);
    check_pin(config.get("backlight_pin"), "backlight_pin", &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid board configuration                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=board.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn check_pin(value: Option<&toml::Value>, name: &str, errors: &mut Vec<String>) {
    match value {
        None => {}
        Some(toml::Value::Integer(pin)) => match *pin {
            22..=25 => errors.push(format!("{}: GPIO{} does not exist", name, pin)),
            26..=37 => errors.push(format!("{}: GPIO{} is wired to flash/PSRAM", name, pin)),
            p if (0..=MAX_GPIO).contains(&p) => {}
            _ => errors.push(format!("{} must be a GPIO number 0-{}", name, MAX_GPIO)),
        },
        Some(_) => errors.push(format!("{} must be an integer", name)),
    }
}

fn check_pin_array(value: Option<&toml::Value>, name: &str, len: usize, errors: &mut Vec<String>) {
    match value {
        None => {}
        Some(toml::Value::Array(pins)) => {
            if pins.len() != len {
                errors.push(format!("{} must list exactly {} pins", name, len));
            }
            for (i, pin) in pins.iter().enumerate() {
                check_pin(Some(pin), &format!("{}[{}]", name, i), errors);
            }
        }
        Some(_) => errors.push(format!("{} must be an array", name)),
    }
}

fn check_positive(value: Option<&toml::Value>, name: &str, errors: &mut Vec<String>) {
    match value {
        None => {}
        Some(toml::Value::Integer(n)) if *n > 0 => {}
        Some(_) => errors.push(format!("{} must be a positive integer", name)),
    }
}

fn validate_panel(config: &toml::Value, errors: &mut Vec<String>) {
    let panel = match config.get("panel") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[panel] must be a table".to_string());
            return;
        }
        None => return,
    };

    if let Some(layout) = panel.get("layout") {
        match layout.as_str() {
            Some("rgb") | Some("spi") => {}
            _ => errors.push("[panel] layout must be 'rgb' or 'spi'".to_string()),
        }
    }

    if let Some(rgb) = panel.get("rgb").and_then(|v| v.as_table()) {
        check_positive(rgb.get("width"), "[panel.rgb] width", errors);
        check_positive(rgb.get("height"), "[panel.rgb] height", errors);
        check_positive(rgb.get("pclk_hz"), "[panel.rgb] pclk_hz", errors);
        for name in ["de", "vsync", "hsync", "pclk"] {
            check_pin(rgb.get(name), &format!("[panel.rgb] {}", name), errors);
        }
        check_pin_array(rgb.get("red"), "[panel.rgb] red", 5, errors);
        check_pin_array(rgb.get("green"), "[panel.rgb] green", 6, errors);
        check_pin_array(rgb.get("blue"), "[panel.rgb] blue", 5, errors);
    }

    if let Some(spi) = panel.get("spi").and_then(|v| v.as_table()) {
        check_positive(spi.get("width"), "[panel.spi] width", errors);
        check_positive(spi.get("height"), "[panel.spi] height", errors);
        check_positive(spi.get("frequency_hz"), "[panel.spi] frequency_hz", errors);
        for name in ["sck", "mosi", "cs", "dc", "rst"] {
            check_pin(spi.get(name), &format!("[panel.spi] {}", name), errors);
        }
    }
}

fn validate_touch(config: &toml::Value, errors: &mut Vec<String>) {
    let touch = match config.get("touch").and_then(|v| v.as_table()) {
        Some(t) => t,
        None => return,
    };

    for name in ["sda", "scl", "rst"] {
        check_pin(touch.get(name), &format!("[touch] {}", name), errors);
    }
    check_positive(touch.get("frequency_hz"), "[touch] frequency_hz", errors);

    if let Some(toml::Value::Integer(address)) = touch.get("address") {
        if !(0x08..=0x77).contains(address) {
            errors.push("[touch] address must be a 7-bit I2C address".to_string());
        }
    }

    if let Some(map) = touch.get("map").and_then(|v| v.as_table()) {
        let same = |a: &str, b: &str| match (map.get(a), map.get(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        };
        if same("raw_x_min", "raw_x_max") || same("raw_y_min", "raw_y_max") {
            errors.push("[touch.map] raw min and max must differ".to_string());
        }
    }
}

fn validate_render(config: &toml::Value, errors: &mut Vec<String>) {
    let render = match config.get("render").and_then(|v| v.as_table()) {
        Some(t) => t,
        None => return,
    };

    check_positive(render.get("buffer_divisor"), "[render] buffer_divisor", errors);
    check_positive(render.get("loop_period_ms"), "[render] loop_period_ms", errors);
    check_positive(render.get("refresh_period_ms"), "[render] refresh_period_ms", errors);
    check_positive(render.get("input_period_ms"), "[render] input_period_ms", errors);

    if let Some(policy) = render.get("on_alloc_failure") {
        match policy.as_str() {
            Some("continue") | Some("halt") => {}
            _ => errors.push("[render] on_alloc_failure must be 'continue' or 'halt'".to_string()),
        }
    }
}
