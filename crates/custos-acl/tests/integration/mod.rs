mod enforcement;
mod fanout;
mod file_store;
mod grant_and_read;
