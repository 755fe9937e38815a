use crate::backend::domain::dates::format_date;
use crate::backend::domain::models::user::User as DomainUser;
use shared::User as SharedUser;

pub struct UserMapper;

impl UserMapper {
    pub fn to_dto(domain: DomainUser) -> SharedUser {
        SharedUser {
            id: domain.id,
            email: domain.email,
            first_name: domain.first_name,
            last_name: domain.last_name,
            birth_date: domain.birth_date.map(format_date),
            is_admin: domain.is_admin,
        }
    }
}
