//! Identify a function generator and apply a sine wave on channel 1.

use simple_logger::SimpleLogger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Enable logging
    SimpleLogger::new().init().unwrap();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyACM1".to_string());

    // Identify the device and open it.
    let mut device = afgctl::open_serial(&path)?;
    for line in device.identify()?.lines() {
        println!("{line}");
    }
    println!("model: {} ({:?} tier)", device.info(), device.tier());

    // Output a 1250 Hz sine wave, 1.254 Vpp with a 0.52 V offset, on channel 1.
    device.apply_sine(1250, 1.254, 0.52, 1)?;
    // device.apply_square(1250, 1.254, 0.52, 1)?;
    // device.apply_ramp(1250, 1.254, 0.52, 1)?;
    // device.apply_noise(1250, 1.254, 0.52, 1)?;
    println!("{:?}", device.get_apply(1)?);
    Ok(())
}
