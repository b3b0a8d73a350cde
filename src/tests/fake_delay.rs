/// Delay that only records how long it was asked to wait.
#[derive(Debug, Default)]
pub struct FakeDelay {
    pub elapsed_ns: u64,
}

impl FakeDelay {
    pub fn new() -> FakeDelay {
        FakeDelay { elapsed_ns: 0 }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl embedded_hal::delay::DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}

#[cfg(feature = "async")]
impl embedded_hal_async::delay::DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}
