mod landscape;
mod sector;
