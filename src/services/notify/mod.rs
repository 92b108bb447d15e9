pub mod email;
pub mod whatsapp;
