pub mod dutycalls;
