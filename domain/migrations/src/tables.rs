use sea_orm_migration::prelude::*;

#[derive(Iden, Clone, Copy)]
pub enum ContentTypes {
	Table,
	Id,
	Name,
	Slug,
}

#[derive(Iden, Clone, Copy)]
pub enum Contents {
	Table,
	Id,
	ContentTypeId,
	Title,
	OriginalTitle,
	Description,
	PosterUrl,
	Year,
	EndYear,
	Duration,
	AgeRestriction,
	KinopoiskId,
	ImdbId,
	Cast,
	Directors,
	Screenwriters,
	Producers,
	Operators,
	Composers,
	Artists,
	Editors,
	VideoQuality,
	SeasonsCount,
	EpisodesCount,
	IsLgbt,
	PlayerUrl,
	CreatedAt,
	UpdatedAt,
}

#[derive(Iden, Clone, Copy)]
pub enum Genres {
	Table,
	Id,
	Name,
	Slug,
}

#[derive(Iden, Clone, Copy)]
pub enum Countries {
	Table,
	Id,
	Name,
	Slug,
}

#[derive(Iden, Clone, Copy)]
pub enum VoiceAuthors {
	Table,
	Id,
	Name,
}

#[derive(Iden, Clone, Copy)]
pub enum ContentGenres {
	Table,
	ContentId,
	GenreId,
}

#[derive(Iden, Clone, Copy)]
pub enum ContentCountries {
	Table,
	ContentId,
	CountryId,
}

#[derive(Iden, Clone, Copy)]
pub enum ContentVoiceAuthors {
	Table,
	ContentId,
	VoiceAuthorId,
}

#[derive(Iden, Clone, Copy)]
pub enum Ratings {
	Table,
	Id,
	ContentId,
	Source,
	Rating,
	Votes,
}

#[derive(Iden, Clone, Copy)]
pub enum ContentSeasons {
	Table,
	ContentId,
	SeasonNumber,
	EpisodesCount,
}
