// FocusDock — Hardware & System Configuration
// Target: ESP32-C3-DevKitM-1 (RISC-V)

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (ESP32-C3-DevKitM-1 pinout)
// ---------------------------------------------------------------------------
pub const PIN_CONSOLE_TX: i32 = 0;  // UART1 TX — command console
pub const PIN_CONSOLE_RX: i32 = 1;  // UART1 RX
pub const PIN_RELAY: i32 = 2;       // Desk-lamp relay (active HIGH)
pub const PIN_BUZZER: i32 = 3;      // Piezo buzzer (active HIGH)
pub const PIN_ENCODER_A: i32 = 4;   // Rotary encoder phase A (INPUT_PULLUP)
pub const PIN_ENCODER_B: i32 = 5;   // Rotary encoder phase B (INPUT_PULLUP)
pub const PIN_I2C_SDA: i32 = 6;     // I2C data line (OLED + DS3231)
pub const PIN_I2C_SCL: i32 = 7;     // I2C clock line
pub const PIN_SONAR_TRIG: i32 = 8;  // HC-SR04 trigger
pub const PIN_BUTTON: i32 = 9;      // On-board BOOT button (INPUT_PULLUP, active LOW)
pub const PIN_SONAR_ECHO: i32 = 10; // HC-SR04 echo, through a 5 V → 3.3 V divider
pub const PIN_PHONE_IR: i32 = 18;   // IR cradle sensor output

/// IR reflective modules pull their output LOW when the beam is blocked,
/// i.e. when a phone sits in the cradle.
pub const PHONE_IR_ACTIVE_LOW: bool = true;

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_OLED: u8 = 0x3C;
pub const I2C_ADDR_DS3231: u8 = 0x68;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Display (SSD1306 OLED)
// ---------------------------------------------------------------------------
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 64;
pub const DISPLAY_BUFFER_SIZE: usize = (SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize) / 8; // 1024

// ---------------------------------------------------------------------------
// Session Timer
// ---------------------------------------------------------------------------
pub const TIMER_MIN_MINUTES: u16 = 1;
pub const TIMER_MAX_MINUTES: u16 = 600;
pub const DEFAULT_TIMER_MINUTES: u16 = 25;
/// Quadrature gives 4 electrical transitions per mechanical detent.
pub const ENCODER_TICKS_PER_MINUTE: i32 = 4;

// ---------------------------------------------------------------------------
// Timing (milliseconds unless noted)
// ---------------------------------------------------------------------------
pub const CONTROL_TICK_MS: u64 = 10;        // base control-loop cadence (~100 Hz)
pub const DEBOUNCE_MS: u64 = 50;
pub const LONG_PRESS_MS: u64 = 2000;
pub const PRESENCE_POLL_MS: u64 = 200;
pub const PHONE_POLL_MS: u64 = 150;
pub const DISPLAY_REFRESH_MS: u64 = 250;
pub const ALERT_TOGGLE_MS: u64 = 220;
pub const ABORTED_SHOW_MS: u64 = 1500;      // "Cancelled" screen hold before Idle
pub const STATUS_MESSAGE_MS: u64 = 3000;    // console feedback hold on the display
pub const BOOT_SPLASH_MS: u64 = 1000;

// ---------------------------------------------------------------------------
// Presence Sensing (HC-SR04)
// ---------------------------------------------------------------------------
pub const PRESENCE_THRESHOLD_CM: f32 = 100.0;
pub const SONAR_START_TIMEOUT_US: u64 = 5_000;  // echo line never went high
pub const SONAR_PULSE_TIMEOUT_US: u64 = 30_000; // ~5 m round trip, out of range

// ---------------------------------------------------------------------------
// Command Console (UART1)
// ---------------------------------------------------------------------------
pub const CONSOLE_BAUD: u32 = 115_200;
pub const CONSOLE_LINE_MAX: usize = 64;
