use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use mashar_auth::{Claims, Role};
use mashar_core::PaginationMeta;
use mashar_models::branches::{Branch, BranchWithUsage, CreateBranchDto};
use mashar_models::classes::{Class, ClassDto, ClassSummary};
use mashar_models::common::{HealthResponse, LessonTiming, MessageResponse};
use mashar_models::exams::{CloneExamDto, Exam, ExamDto, ExamFilter};
use mashar_models::games::{
    Attempt, CloneGameDto, CreateGameDto, GameCreatedResponse, GameForm, GameListItem,
    GameStatusView, GameWithStatus, PaginatedGamesResponse, Riddle, SaveGameDto, Team, TeamData,
    TeamProgress, VectorResult,
};
use mashar_models::holidays::{CloneCalendarDto, Holiday, HolidayCalendar, HolidayCalendarDto};
use mashar_models::lessons::{
    Answer, AvailabilityResponse, FormDetailsDto, LessonFormView, LessonGroup, LessonGroupDto,
    LessonRegistration, PaginatedLessonGroupsResponse, Question, RegisterLessonDto,
    RegistrationRangeDto, SaveFormDto, SaveLessonGroupsDto, TeacherRef,
};
use mashar_models::playlists::{
    PaginatedPlaylistsResponse, Playlist, PlaylistDto, PlaylistOrder, ReorderPlaylistsDto,
};
use mashar_models::schools::{School, SchoolDto};
use mashar_models::templates::{CreateTemplateDto, PlanTemplate, UpdateTemplateDto};
use mashar_models::users::{
    ChangePasswordDto, ChangeRoleDto, LoginRequest, LoginResponse, PaginatedUsersResponse,
    RegisterUserDto, SaveLessonListDto, SaveUserDto, SetLessonsDto, TeacherSummary, User,
    UserCountResponse, UserLesson,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::me,
        crate::modules::users::controller::register_user,
        crate::modules::users::controller::list_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::list_by_group,
        crate::modules::users::controller::list_teachers,
        crate::modules::users::controller::count_by_branch,
        crate::modules::users::controller::change_password,
        crate::modules::users::controller::change_role,
        crate::modules::users::controller::save_user,
        crate::modules::users::controller::set_lessons,
        crate::modules::users::controller::save_lesson_list,
        crate::modules::branches::controller::list_branches,
        crate::modules::branches::controller::add_branch,
        crate::modules::branches::controller::delete_branch,
        crate::modules::games::controller::list_games,
        crate::modules::games::controller::get_game_form,
        crate::modules::games::controller::get_game_status,
        crate::modules::games::controller::start_game,
        crate::modules::games::controller::stop_game,
        crate::modules::games::controller::create_game,
        crate::modules::games::controller::save_game,
        crate::modules::games::controller::clone_game,
        crate::modules::games::controller::delete_game,
        crate::modules::games::controller::validate_vector_path,
        crate::modules::games::controller::validate_vector_query,
        crate::modules::schools::controller::list_schools,
        crate::modules::schools::controller::get_school,
        crate::modules::schools::controller::add_school,
        crate::modules::schools::controller::update_school,
        crate::modules::schools::controller::delete_school,
        crate::modules::classes::controller::list_classes,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::add_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::delete_class,
        crate::modules::templates::controller::list_templates,
        crate::modules::templates::controller::get_template,
        crate::modules::templates::controller::add_template,
        crate::modules::templates::controller::update_template,
        crate::modules::templates::controller::delete_template,
        crate::modules::exams::controller::list_exams,
        crate::modules::exams::controller::filter_exams,
        crate::modules::exams::controller::get_exam,
        crate::modules::exams::controller::add_exam,
        crate::modules::exams::controller::clone_exam,
        crate::modules::exams::controller::update_exam,
        crate::modules::exams::controller::delete_exam,
        crate::modules::holidays::controller::list_calendars,
        crate::modules::holidays::controller::get_calendar,
        crate::modules::holidays::controller::add_calendar,
        crate::modules::holidays::controller::clone_calendar,
        crate::modules::holidays::controller::update_calendar,
        crate::modules::holidays::controller::delete_calendar,
        crate::modules::lessons::controller::list_groups,
        crate::modules::lessons::controller::save_groups,
        crate::modules::lessons::controller::save_group,
        crate::modules::lessons::controller::add_group,
        crate::modules::lessons::controller::delete_group,
        crate::modules::lessons::controller::get_availability,
        crate::modules::lessons::controller::list_forms,
        crate::modules::lessons::controller::get_form,
        crate::modules::lessons::controller::add_form,
        crate::modules::lessons::controller::save_form,
        crate::modules::lessons::controller::update_form_details,
        crate::modules::lessons::controller::clone_form,
        crate::modules::lessons::controller::delete_form,
        crate::modules::lessons::controller::register,
        crate::modules::lessons::controller::list_registrations,
        crate::modules::lessons::controller::delete_registration,
        crate::modules::lessons::controller::delete_slot,
        crate::modules::lessons::controller::purge_old_registrations,
        crate::modules::lessons::controller::purge_all_registrations,
        crate::modules::playlists::controller::list_playlists,
        crate::modules::playlists::controller::add_playlist,
        crate::modules::playlists::controller::edit_playlist,
        crate::modules::playlists::controller::reorder_playlists,
        crate::modules::playlists::controller::delete_playlist,
        crate::modules::health::controller::health,
    ),
    components(
        schemas(
            Role,
            Claims,
            PaginationMeta,
            MessageResponse,
            HealthResponse,
            LessonTiming,
            User,
            UserLesson,
            TeacherSummary,
            LoginRequest,
            LoginResponse,
            RegisterUserDto,
            ChangePasswordDto,
            ChangeRoleDto,
            SaveUserDto,
            SetLessonsDto,
            SaveLessonListDto,
            PaginatedUsersResponse,
            UserCountResponse,
            Branch,
            BranchWithUsage,
            CreateBranchDto,
            Team,
            Riddle,
            TeamData,
            Attempt,
            TeamProgress,
            GameStatusView,
            VectorResult,
            GameForm,
            GameWithStatus,
            GameListItem,
            PaginatedGamesResponse,
            CreateGameDto,
            SaveGameDto,
            CloneGameDto,
            GameCreatedResponse,
            School,
            SchoolDto,
            Class,
            ClassSummary,
            ClassDto,
            PlanTemplate,
            CreateTemplateDto,
            UpdateTemplateDto,
            Exam,
            ExamDto,
            ExamFilter,
            CloneExamDto,
            Holiday,
            HolidayCalendar,
            HolidayCalendarDto,
            CloneCalendarDto,
            LessonGroup,
            LessonGroupDto,
            SaveLessonGroupsDto,
            PaginatedLessonGroupsResponse,
            AvailabilityResponse,
            Question,
            LessonFormView,
            SaveFormDto,
            FormDetailsDto,
            TeacherRef,
            Answer,
            LessonRegistration,
            RegisterLessonDto,
            RegistrationRangeDto,
            Playlist,
            PlaylistDto,
            PlaylistOrder,
            ReorderPlaylistsDto,
            PaginatedPlaylistsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and token introspection"),
        (name = "Users", description = "Staff accounts, roles and lesson availability"),
        (name = "Branches", description = "Branch management (superadmin)"),
        (name = "Games", description = "Treasure-hunt games and live runs"),
        (name = "Vector", description = "Student vector submissions"),
        (name = "Schools", description = "Schools served by a branch"),
        (name = "Classes", description = "Classes and their lesson plans"),
        (name = "Plan templates", description = "Lesson plan templates"),
        (name = "Exams", description = "Exam bank"),
        (name = "Holidays", description = "Holiday calendars"),
        (name = "Lessons", description = "Lesson groups, registration forms and registrations"),
        (name = "Playlists", description = "YouTube playlists"),
        (name = "Health", description = "Service health")
    ),
    info(
        title = "Mashar API",
        version = "0.1.0",
        description = "Administrative backend for Mashar school branches: staff, games, planning, exams and lesson registrations.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
