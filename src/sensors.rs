pub mod encoder;
pub mod odometry;
