use std::time::Instant;

/// Banner-style logger for long scenario tests.
pub struct TestLogger {
    test_name: String,
    start_time: Instant,
    steps: usize,
}

impl TestLogger {
    pub fn new(test_name: &str) -> Self {
        let separator = "=".repeat(60);
        println!("\n{}", separator);
        println!("[TEST START] {}", test_name);
        println!("{}", separator);
        Self {
            test_name: test_name.to_string(),
            start_time: Instant::now(),
            steps: 0,
        }
    }

    /// Log one scenario step with a running counter.
    pub fn step(&mut self, description: &str) {
        self.steps += 1;
        println!("[STEP {}] {}", self.steps, description);
    }

    pub fn log_actual<T: std::fmt::Debug>(&self, value: &T) {
        println!("[ACTUAL] {:?}", value);
    }

    pub fn pass(&self) {
        let elapsed = self.start_time.elapsed();
        println!(
            "[RESULT] {} PASSED after {} steps in {:?}",
            self.test_name, self.steps, elapsed
        );
        println!("{}\n", "=".repeat(60));
    }
}
