mod mongodb;
mod mail_service;

pub use mongodb::MongoDBService;
pub use mail_service::MailService;
