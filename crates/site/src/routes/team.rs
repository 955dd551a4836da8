//! Team page route handler.

use askama::Template;
use askama_web::WebTemplate;
use solar_portal_core::User;

use crate::filters;
use crate::middleware::OptionalUser;

/// A team member card.
pub struct TeamMember {
    pub name: &'static str,
    pub role: &'static str,
    pub expertise: &'static str,
    pub image: &'static str,
    pub bio: &'static str,
}

/// A company value card.
pub struct CompanyValue {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub const TEAM: [TeamMember; 6] = [
    TeamMember {
        name: "Jean Pierre",
        role: "Ingénieur en Énergie Solaire",
        expertise: "Installation & Maintenance",
        image: "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?auto=format&fit=crop&q=80&w=400&h=400",
        bio: "Expert avec 15+ ans d'expérience en installation de systèmes solaires photovoltaïques.",
    },
    TeamMember {
        name: "Marie Dubois",
        role: "Directrice Technique",
        expertise: "Performance & Audit",
        image: "https://images.unsplash.com/photo-1494790108377-be9c29b29330?auto=format&fit=crop&q=80&w=400&h=400",
        bio: "Spécialiste en optimisation des systèmes solaires et audit énergétique.",
    },
    TeamMember {
        name: "Claude Martin",
        role: "Responsable Commercial",
        expertise: "Ventes & Développement",
        image: "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?auto=format&fit=crop&q=80&w=400&h=400",
        bio: "Passionné par la promotion des énergies renouvelables et le développement commercial.",
    },
    TeamMember {
        name: "Sophie Laurent",
        role: "Ingénieure Projet",
        expertise: "Conception & Planification",
        image: "https://images.unsplash.com/photo-1438761681033-6461ffad8d80?auto=format&fit=crop&q=80&w=400&h=400",
        bio: "Coordinatrice de projets solaires complexes avec expertise en gestion d'équipe.",
    },
    TeamMember {
        name: "Patrick Rousseau",
        role: "Technicien Senior",
        expertise: "Installation & Dépannage",
        image: "https://images.unsplash.com/photo-1507539332150-34daaf81b324?auto=format&fit=crop&q=80&w=400&h=400",
        bio: "Technicien expérimenté en installation et maintenance préventive des systèmes solaires.",
    },
    TeamMember {
        name: "Caroline Lefevre",
        role: "Responsable Formation",
        expertise: "Pédagogie & Formation",
        image: "https://images.unsplash.com/photo-1438761681033-6461ffad8d80?auto=format&fit=crop&q=80&w=400&h=400",
        bio: "Formatrice dévouée à la transmission du savoir-faire en énergie solaire.",
    },
];

pub const VALUES: [CompanyValue; 4] = [
    CompanyValue {
        icon: "leaf",
        title: "Durabilité",
        description: "Nous nous engageons pour un avenir écologique et durable.",
    },
    CompanyValue {
        icon: "handshake",
        title: "Intégrité",
        description: "Transparence et honnêteté dans tous nos projets et relations.",
    },
    CompanyValue {
        icon: "lightbulb",
        title: "Innovation",
        description: "Nous recherchons constamment de meilleures solutions technologiques.",
    },
    CompanyValue {
        icon: "users",
        title: "Collaboration",
        description: "Travail d'équipe et partenariats pour réussir ensemble.",
    },
];

/// Team page template.
#[derive(Template, WebTemplate)]
#[template(path = "team.html")]
pub struct TeamTemplate {
    pub current_user: Option<User>,
    pub members: &'static [TeamMember],
    pub values: &'static [CompanyValue],
}

/// Display the team page.
pub async fn index(OptionalUser(current_user): OptionalUser) -> TeamTemplate {
    TeamTemplate {
        current_user,
        members: &TEAM,
        values: &VALUES,
    }
}
