use clap::Parser;
use embedded_hal::delay::DelayNs;
use tmp117::{Address, PresenceProbe, Tmp117Builder, UNAVAILABLE_TEMPERATURE};

/// Read temperatures from a TMP117 on a Linux I2C bus
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to I2C bus (e.g., /dev/i2c-1)
    #[arg(short, long)]
    path: String,
    /// Sensor address (0x48-0x4b, set by the ADD0 pin)
    #[arg(short, long, default_value = "0x48", value_parser = parse_address)]
    address: Address,
    /// Time between readings, in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    interval_ms: u32,
    /// Number of readings to take (0 reads forever)
    #[arg(short, long, default_value_t = 0)]
    count: u32,
    /// Data-ready polls per reading
    #[arg(long, default_value_t = 50)]
    poll_trials: u8,
    /// Require the device ID register to identify a TMP117
    #[arg(long)]
    check_id: bool,
    /// Probe by reading the device ID register instead of a zero-length write
    /// (for adapters that reject zero-length writes)
    #[arg(long)]
    register_probe: bool,
}

fn parse_address(arg: &str) -> Result<Address, String> {
    let digits = arg.trim_start_matches("0x").trim_start_matches("0X");
    let addr = u8::from_str_radix(digits, 16).map_err(|e| e.to_string())?;
    Address::try_from(addr).map_err(str::to_string)
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    // Open the I2C bus
    let mut i2c = linux_embedded_hal::I2cdev::new(&args.path).expect("Failed to open I2C device");
    // Create and probe the TMP117
    let mut sensor = Tmp117Builder::default()
        .with_address(args.address)
        .with_poll_trials(args.poll_trials)
        .with_id_check(args.check_id)
        .with_probe(if args.register_probe {
            PresenceProbe::DeviceIdRead
        } else {
            PresenceProbe::AddressAck
        })
        .build(&mut i2c, linux_embedded_hal::Delay);
    if !sensor.is_available() {
        log::error!("No TMP117 found at {:#04x} on {}", sensor.address(), args.path);
        if !args.register_probe {
            log::error!("If the adapter rejects zero-length writes, retry with --register-probe");
        }
        std::process::exit(1);
    }
    match sensor.device_id() {
        Ok(id) => log::info!(
            "Found TMP117 at {:#04x}, device ID {:#05x} revision {}",
            sensor.address(),
            id.device_id(),
            id.revision()
        ),
        Err(e) => log::warn!("Could not read device ID: {e:?}"),
    }
    let mut delay = linux_embedded_hal::Delay;
    let mut taken = 0;
    loop {
        let temp = sensor.get_temperature();
        if temp == UNAVAILABLE_TEMPERATURE {
            log::warn!("No valid reading");
        } else {
            log::info!("Temperature: {temp:.4} °C");
        }
        taken += 1;
        if args.count != 0 && taken >= args.count {
            break;
        }
        delay.delay_ms(args.interval_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_argument() {
        assert_eq!(parse_address("0x4a"), Ok(Address::Sda));
        assert_eq!(parse_address("49"), Ok(Address::Vplus));
        assert!(parse_address("0x18").is_err());
        assert!(parse_address("zz").is_err());
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from([
            "tmp117-linux",
            "-p",
            "/dev/i2c-1",
            "-c",
            "3",
            "--check-id",
        ])
        .unwrap();
        assert_eq!(args.address, Address::Gnd);
        assert_eq!(args.count, 3);
        assert_eq!(args.interval_ms, 1000);
        assert!(args.check_id);
        assert!(!args.register_probe);
        let args =
            Args::try_parse_from(["tmp117-linux", "-p", "/dev/i2c-1", "--register-probe"]).unwrap();
        assert!(args.register_probe);
    }
}
