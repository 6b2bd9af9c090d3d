pub mod token_mngr;
