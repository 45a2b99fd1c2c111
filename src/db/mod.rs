pub mod bookingdb;
pub mod categorydb;
pub mod db;
pub mod providerdb;
pub mod reviewdb;
pub mod userdb;
