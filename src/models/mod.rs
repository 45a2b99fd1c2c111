pub mod bookingmodel;
pub mod categorymodel;
pub mod providermodel;
pub mod reviewmodel;
pub mod usermodel;
