mod helpers;
mod home;
mod send_bulk_email;
