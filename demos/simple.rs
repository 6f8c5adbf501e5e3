use dead_reckon::{DeadReckoner, ReckonerParams};
use nalgebra::Vector3;
use std::time::Instant;

fn main() {
    let start = Instant::now();
    let mut reckoner = DeadReckoner::new_with_params(
        start.elapsed().as_secs_f64(),
        ReckonerParams::default(),
    );

    // A short synthetic burst: forward push, then quiet coasting.
    let samples = [
        Vector3::new(0.8, 0.0, 0.0),
        Vector3::new(1.2, 0.1, 0.0),
        Vector3::new(0.4, -0.1, 0.0),
        Vector3::zeros(),
        Vector3::zeros(),
    ];

    for accel in samples {
        std::thread::sleep(std::time::Duration::from_millis(20));
        let now = start.elapsed().as_secs_f64();
        match reckoner.step(accel, now) {
            Ok(state) => println!(
                "t={:.3}s  position=({:+.6}, {:+.6}, {:+.6}) m",
                state.last_timestamp, state.position.x, state.position.y, state.position.z
            ),
            Err(err) => eprintln!("skipping sample: {err}"),
        }
    }
}
